#![forbid(unsafe_code)]

//! Core primitives shared by the paneweave crates.
//!
//! - [`geometry`]: the validated [`Bounds`] rectangle.
//! - [`id`]: typed identifiers ([`PaneId`], [`NodeId`], [`ContentId`]) and the
//!   process-unique token generator.

pub mod geometry;
pub mod id;

pub use geometry::{Bounds, GeometryError};
pub use id::{ContentId, IdKind, IdentifierError, NodeId, PaneId};
