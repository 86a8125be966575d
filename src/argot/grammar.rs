//! Grammar trees and the backtracking match over them.
//!
//! - [`node`] — arena nodes and handles
//! - [`branch`] — per-attempt walk state and the exploration algorithm
//! - [`tree`] — the `Grammar` type: building, verification, matching,
//!   captures

pub mod branch;
pub mod node;
pub mod tree;

pub use branch::{CaptureView, VisitCtx};
pub use node::{Node, NodeId, NodeKind};
pub use tree::Grammar;
