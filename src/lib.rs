//! # argot
//!
//! A grammar-driven command-argument engine for interactive shells.
//!
//! Commands declare their accepted argument forms as a tree of alternative
//! token sequences (a [`Grammar`](argot::Grammar)). At runtime the engine
//! validates a whitespace-tokenized input line against that tree, resolves
//! exactly one matching alternative, exposes the captured values by node
//! name, and — for partial input — computes autocomplete suggestions.
//!
//! For comprehensive testing guidelines, see the tests/ directory; all engine
//! tests assert on captures and completion output, never on internals.

pub mod argot;
