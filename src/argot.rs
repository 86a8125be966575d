//! Core namespace for the argot engine.
//!
//! Module layout:
//!
//! - [`error`] — the crate error type and `Result` alias
//! - [`lexing`] — whitespace tokenization of command lines
//! - [`handler`] — field handlers: per-token validators/completers
//! - [`grammar`] — the node tree, the backtracking walk, and the `Grammar` API
//! - [`complete`] — autocomplete result model
//! - [`registry`] — the process-wide prototype registry

pub mod complete;
pub mod error;
pub mod grammar;
pub mod handler;
pub mod lexing;
pub mod registry;

pub use complete::{CandidateGroup, Completion};
pub use error::{Error, Result};
pub use grammar::{Grammar, Node, NodeId, NodeKind};
pub use handler::{chain, FieldHandler};
pub use registry::Registry;
