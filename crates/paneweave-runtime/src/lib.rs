#![forbid(unsafe_code)]

//! Paneweave Runtime
//!
//! Undoable editing on top of `paneweave-layout`.
//!
//! # Key Components
//!
//! - [`Command`] - A [`LayoutCommand`] that can be executed and undone
//! - [`History`] - Bounded undo/redo stacks
//! - [`LayoutController`] - Owns a tree, runs commands, nests transactions
//! - [`ContentHost`] - Keeps one content handle per visible pane
//! - [`EngineConfig`] - History depth, divider thickness, default split ratio
//!
//! # How it fits in the system
//! `paneweave-core` holds identifiers and rectangles, `paneweave-layout` the
//! tree, solver, and reconciler. This crate is what an application talks to:
//! every edit goes through a [`LayoutController`], and the
//! [`ExecutionReport`] it returns tells the presentation layer which panes to
//! add, drop, move, or refresh.
//!
//! # Example
//!
//! ```
//! use paneweave_core::{Bounds, ContentId, PaneId};
//! use paneweave_layout::{PaneTree, SplitPosition};
//! use paneweave_runtime::LayoutController;
//!
//! let p1 = PaneId::new("p1").unwrap();
//! let mut ctl = LayoutController::new(PaneTree::singleton(p1.clone(), ContentId::new("c1").unwrap()));
//!
//! let report = ctl
//!     .split_pane(p1.clone(), ContentId::new("c2").unwrap(), SplitPosition::Right)
//!     .unwrap();
//! assert_eq!(report.diff.added.len(), 1);
//!
//! let layout = ctl.solve(Bounds::from_size(800, 600));
//! assert_eq!(layout.pane_bounds(&p1).map(|b| b.width()), Some(398));
//!
//! ctl.undo().unwrap();
//! assert_eq!(ctl.tree().leaf_count(), 1);
//! ```

pub mod command;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod history;
pub mod transaction;

pub use command::{Command, CommandKind, CommandState, LayoutCommand, SplitIds};
pub use config::{ConfigError, EngineConfig};
pub use content::{ContentChanges, ContentFactory, ContentHost};
pub use controller::{ExecutionReport, LayoutController};
pub use error::{CommandError, ControllerError};
pub use history::History;
pub use transaction::{HistoryEntry, TransactionOutcome};
