//! Branches and the backtracking walk over a grammar tree.
//!
//! This module implements the core matching algorithm:
//! 1. Seeds one branch over the full token range at the root
//! 2. Fans branches out over alternatives, loop re-entries and nested
//!    grammars, dropping any branch whose next token is rejected
//! 3. Records every consumed token (or nested-grammar subrange) against the
//!    node that consumed it, per branch
//! 4. Completes a branch when it reaches a leaf; the caller keeps only the
//!    branches that consumed the whole line
//!
//! Branches are plain values sharing no mutable state. Nothing durable is
//! written during the walk: the record list is replayed onto the tree only
//! after the caller has chosen exactly one completed branch. A losing branch
//! is simply dropped.

use crate::argot::grammar::node::{Node, NodeId, NodeKind};
use crate::argot::grammar::tree::Grammar;
use crate::argot::handler::FieldHandler;

/// One consumption event recorded by a branch
#[derive(Debug, Clone)]
pub(crate) enum Record {
    /// `node` consumed the token at `index`
    Token { node: NodeId, index: usize },
    /// `node` embeds a grammar that matched the token subrange `start..end`,
    /// ending at `leaf` with its own record list
    Sub {
        node: NodeId,
        start: usize,
        end: usize,
        leaf: NodeId,
        records: Vec<Record>,
    },
}

/// One in-progress attempt to match the token sequence
#[derive(Debug, Clone, Default)]
pub(crate) struct Branch {
    /// Cursor into the borrowed token slice
    pub pos: usize,
    /// Consumption history, replayed onto the tree on commit
    pub records: Vec<Record>,
}

/// One completed alternative: where it stopped, which leaf it reached, and
/// what it consumed along the way
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub end: usize,
    pub leaf: NodeId,
    pub records: Vec<Record>,
}

/// A node reached with no committed input left, and what its handler would
/// suggest for the partial token
#[derive(Debug, Clone)]
pub(crate) struct CompletionSource {
    /// Node-name path from the root, space-joined
    pub path: String,
    pub candidates: Vec<String>,
}

/// Per-visit handler context produced by `runtime_init`.
///
/// Handlers are shared by every branch visiting their node, so anything a
/// visit resolves travels here instead of mutating the handler.
#[derive(Debug, Clone, Default)]
pub struct VisitCtx {
    /// For back-references: the token the target ancestor captured on the
    /// current branch, if it captured one
    pub expected: Option<String>,
}

/// Read-only view of what the current branch has captured so far
pub struct CaptureView<'a> {
    records: &'a [Record],
    tokens: &'a [String],
}

impl<'a> CaptureView<'a> {
    pub(crate) fn new(records: &'a [Record], tokens: &'a [String]) -> Self {
        Self { records, tokens }
    }

    /// The most recent token (or nested-grammar substring) the branch
    /// recorded against `node`
    pub fn token_for(&self, node: NodeId) -> Option<String> {
        self.records.iter().rev().find_map(|record| match record {
            Record::Token { node: n, index } if *n == node => {
                Some(self.tokens[*index].clone())
            }
            Record::Sub {
                node: n,
                start,
                end,
                ..
            } if *n == node => Some(self.tokens[*start..*end].join(" ")),
            _ => None,
        })
    }
}

/// The walk itself: immutable over the grammar and token slice, threading
/// branch values through the tree
pub(crate) struct Walker<'a> {
    grammar: &'a Grammar,
    tokens: &'a [String],
    /// `Some(partial)` switches the walk into prompt mode: exhausted
    /// branches become completion sources instead of dying
    partial: Option<&'a str>,
}

impl<'a> Walker<'a> {
    /// Explore every alternative of `grammar` against `tokens[start..]`.
    ///
    /// `path` carries the node-name prefix for completion-source grouping
    /// (non-empty when exploring a nested grammar); `sources` accumulates
    /// completion sources across nesting levels.
    pub fn explore(
        grammar: &'a Grammar,
        tokens: &'a [String],
        start: usize,
        partial: Option<&'a str>,
        path: &mut Vec<String>,
        sources: &mut Vec<CompletionSource>,
    ) -> Vec<Outcome> {
        let walker = Walker {
            grammar,
            tokens,
            partial,
        };
        let mut outcomes = Vec::new();
        let seed = Branch {
            pos: start,
            records: Vec::new(),
        };
        walker.visit(grammar.root(), seed, path, sources, &mut outcomes);
        outcomes
    }

    fn visit(
        &self,
        id: NodeId,
        branch: Branch,
        path: &mut Vec<String>,
        sources: &mut Vec<CompletionSource>,
        outcomes: &mut Vec<Outcome>,
    ) {
        let node = self.grammar.node(id);
        match node.kind() {
            NodeKind::Root => {
                for &child in node.children() {
                    self.visit(child, branch.clone(), path, sources, outcomes);
                }
            }
            NodeKind::Leaf { .. } => {
                outcomes.push(Outcome {
                    end: branch.pos,
                    leaf: id,
                    records: branch.records,
                });
            }
            NodeKind::Normal | NodeKind::Loop => {
                if matches!(node.kind(), NodeKind::Loop) {
                    // Zero-iteration exit: the loop body is optional
                    for &child in node.children() {
                        self.visit(child, branch.clone(), path, sources, outcomes);
                    }
                }
                // Loop re-entries would otherwise stack the same name
                let pushed = path.last().map(String::as_str) != Some(node.name());
                if pushed {
                    path.push(node.name().to_string());
                }
                self.visit_slot(id, node, branch, path, sources, outcomes);
                if pushed {
                    path.pop();
                }
            }
        }
    }

    /// One consumption attempt at a Normal/Loop node
    fn visit_slot(
        &self,
        id: NodeId,
        node: &Node,
        branch: Branch,
        path: &mut Vec<String>,
        sources: &mut Vec<CompletionSource>,
        outcomes: &mut Vec<Outcome>,
    ) {
        let Some(handler) = node.handler() else {
            // Construction guarantees Normal/Loop nodes carry a handler
            return;
        };

        if let FieldHandler::SubGrammar(sub) = handler {
            let start = branch.pos;
            let sub_outcomes =
                Walker::explore(sub, self.tokens, start, self.partial, path, sources);
            for sub_outcome in sub_outcomes {
                let mut next = branch.clone();
                next.pos = sub_outcome.end;
                next.records.push(Record::Sub {
                    node: id,
                    start,
                    end: sub_outcome.end,
                    leaf: sub_outcome.leaf,
                    records: sub_outcome.records,
                });
                // A zero-length sub-match must not re-enter a loop
                let advanced = sub_outcome.end > start;
                self.continue_after(id, node, next, advanced, path, sources, outcomes);
            }
            return;
        }

        let view = CaptureView::new(&branch.records, self.tokens);
        let ctx = handler.runtime_init(&view);

        if branch.pos == self.tokens.len() {
            if let Some(partial) = self.partial {
                sources.push(CompletionSource {
                    path: path.join(" "),
                    candidates: handler.candidates(partial, &ctx),
                });
            }
            return;
        }

        if !handler.accepts(&self.tokens[branch.pos], &ctx) {
            return;
        }

        let mut next = branch;
        next.records.push(Record::Token {
            node: id,
            index: next.pos,
        });
        next.pos += 1;
        self.continue_after(id, node, next, true, path, sources, outcomes);
    }

    /// Fan out after a successful consumption: loops re-enter themselves
    /// (their exits run on re-entry), other nodes descend into children
    fn continue_after(
        &self,
        id: NodeId,
        node: &Node,
        branch: Branch,
        advanced: bool,
        path: &mut Vec<String>,
        sources: &mut Vec<CompletionSource>,
        outcomes: &mut Vec<Outcome>,
    ) {
        match node.kind() {
            NodeKind::Loop => {
                if advanced {
                    self.visit(id, branch, path, sources, outcomes);
                }
            }
            _ => {
                for &child in node.children() {
                    self.visit(child, branch.clone(), path, sources, outcomes);
                }
            }
        }
    }
}
