#![forbid(unsafe_code)]

//! `paneweave-doctor`: inspect layout documents from the command line.

pub mod cli;
pub mod error;
pub mod inspect;

pub use cli::run_from_env;
pub use error::{DoctorError, Result};
