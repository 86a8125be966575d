//! Field handlers: the per-token validators and completers bound to nodes.
//!
//! A handler answers two questions about one token slot — "does this token
//! belong here?" and "what could this partial token become?" — plus an
//! optional per-visit initialization step that resolves cross-references to
//! values an ancestor node has already captured on the current branch.
//!
//! Handlers are a tagged enum rather than a trait object: cloning is derived
//! structurally, and a new handler kind is a new variant, not a new subclass.
//! Capture recording is *not* done here; the walk records consumed tokens per
//! branch and the grammar writes node captures only once a unique match has
//! been chosen.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::argot::error::{Error, Result};
use crate::argot::grammar::branch::{CaptureView, VisitCtx};
use crate::argot::grammar::tree::Grammar;
use crate::argot::grammar::NodeId;

/// Shape of a decimal token, checked before any range comparison
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("decimal pattern is valid"));

/// A reusable validator/completer for one token slot
#[derive(Debug, Clone)]
pub enum FieldHandler {
    /// Accepts exactly `true` or `false`
    Boolean,
    /// Accepts a decimal number within a range; either bound may be
    /// inclusive or exclusive
    Decimal {
        min: f64,
        max: f64,
        min_inclusive: bool,
        max_inclusive: bool,
    },
    /// Accepts one fixed word
    Literal(String),
    /// Accepts any word of a fixed set
    OneOf(Vec<String>),
    /// Accepts any word at all (open string set); suggests nothing
    AnyWord,
    /// Accepts only the token a named ancestor node captured on the same
    /// branch; the context-sensitive case `runtime_init` exists for
    BackRef {
        target: String,
        resolved: Option<NodeId>,
    },
    /// Embeds a complete grammar as one argument; the node consumes whatever
    /// token subrange one of the sub-grammar's alternatives matches
    SubGrammar(Box<Grammar>),
}

impl FieldHandler {
    pub fn boolean() -> Self {
        FieldHandler::Boolean
    }

    /// Decimal range with both bounds inclusive
    pub fn decimal(min: f64, max: f64) -> Result<Self> {
        Self::decimal_bounds(min, true, max, true)
    }

    /// Decimal range with explicit bound inclusivity
    pub fn decimal_bounds(
        min: f64,
        min_inclusive: bool,
        max: f64,
        max_inclusive: bool,
    ) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidParameters(format!(
                "decimal range {}..{} is empty or non-finite",
                min, max
            )));
        }
        Ok(FieldHandler::Decimal {
            min,
            max,
            min_inclusive,
            max_inclusive,
        })
    }

    pub fn literal(word: impl Into<String>) -> Self {
        FieldHandler::Literal(word.into())
    }

    pub fn one_of<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldHandler::OneOf(words.into_iter().map(Into::into).collect())
    }

    pub fn any_word() -> Self {
        FieldHandler::AnyWord
    }

    /// Accept only the token captured by the ancestor node named `target`.
    /// The name is resolved to a handle by the grammar's link pass.
    pub fn back_ref(target: impl Into<String>) -> Self {
        FieldHandler::BackRef {
            target: target.into(),
            resolved: None,
        }
    }

    pub fn sub_grammar(grammar: Grammar) -> Self {
        FieldHandler::SubGrammar(Box::new(grammar))
    }

    /// Per-visit initialization: resolve cross-references against the
    /// captures the current branch has recorded so far.
    ///
    /// Runs once each time the walk reaches the owning node. It must not
    /// mutate the handler — many branches visit the same node concurrently —
    /// so resolved context travels in the returned [`VisitCtx`] instead.
    pub fn runtime_init(&self, view: &CaptureView<'_>) -> VisitCtx {
        match self {
            FieldHandler::BackRef { resolved, .. } => VisitCtx {
                expected: resolved.and_then(|id| view.token_for(id)),
            },
            _ => VisitCtx::default(),
        }
    }

    /// Test whether `token` is acceptable in this slot
    pub fn accepts(&self, token: &str, ctx: &VisitCtx) -> bool {
        match self {
            FieldHandler::Boolean => token == "true" || token == "false",
            FieldHandler::Decimal {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                if !DECIMAL_RE.is_match(token) {
                    return false;
                }
                match token.parse::<f64>() {
                    Ok(n) => {
                        let above = if *min_inclusive { n >= *min } else { n > *min };
                        let below = if *max_inclusive { n <= *max } else { n < *max };
                        above && below
                    }
                    Err(_) => false,
                }
            }
            FieldHandler::Literal(word) => token == word,
            FieldHandler::OneOf(words) => words.iter().any(|w| w == token),
            FieldHandler::AnyWord => !token.is_empty(),
            FieldHandler::BackRef { .. } => ctx.expected.as_deref() == Some(token),
            // Sub-grammar nodes are expanded by the walk itself; a single
            // token can never satisfy one here.
            FieldHandler::SubGrammar(_) => false,
        }
    }

    /// Prefix-consistent suggestions for a partial token
    pub fn candidates(&self, partial: &str, ctx: &VisitCtx) -> Vec<String> {
        match self {
            FieldHandler::Boolean => prefix_filter(["true", "false"], partial),
            FieldHandler::Decimal { .. } => Vec::new(),
            FieldHandler::Literal(word) => prefix_filter([word.as_str()], partial),
            FieldHandler::OneOf(words) => {
                prefix_filter(words.iter().map(String::as_str), partial)
            }
            FieldHandler::AnyWord => Vec::new(),
            FieldHandler::BackRef { .. } => match &ctx.expected {
                Some(word) => prefix_filter([word.as_str()], partial),
                None => Vec::new(),
            },
            FieldHandler::SubGrammar(grammar) => grammar.first_candidates(partial),
        }
    }

    /// The ancestor name a link pass must resolve, if any
    pub(crate) fn link_target(&self) -> Option<&str> {
        match self {
            FieldHandler::BackRef { target, .. } => Some(target.as_str()),
            _ => None,
        }
    }

    pub(crate) fn set_link(&mut self, id: NodeId) {
        if let FieldHandler::BackRef { resolved, .. } = self {
            *resolved = Some(id);
        }
    }
}

fn prefix_filter<'a, I>(words: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    words
        .into_iter()
        .filter(|w| w.starts_with(partial))
        .map(str::to_string)
        .collect()
}

/// Build a fixed-arity tuple grammar by mechanically chaining `count` copies
/// of one primitive handler (e.g. a three-component vector of decimals).
///
/// Component nodes are named `name0 .. nameN-1`; the single alternative ends
/// in leaf id `"0"`.
pub fn chain(name: &str, handler: FieldHandler, count: usize) -> Result<Grammar> {
    if count == 0 {
        return Err(Error::InvalidParameters(
            "chain of zero components".to_string(),
        ));
    }

    let mut grammar = Grammar::new(name);
    let mut parent = grammar.root();
    for index in 0..count {
        let component =
            crate::argot::grammar::Node::normal(format!("{}{}", name, index), handler.clone());
        parent = grammar.add_child(parent, component)?;
    }
    grammar.end_branch(parent, "0")?;
    Ok(grammar)
}
