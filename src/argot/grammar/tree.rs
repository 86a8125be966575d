//! The `Grammar` type: tree building, verification, matching and captures.
//!
//! A grammar is built once per command at registration time, verified and
//! linked there, then cloned per invocation. `validate` drives the
//! backtracking walk over a whitespace-tokenized line and commits captures
//! only when exactly one alternative matched; `prompt` runs the same walk in
//! completion mode over a partial line and never commits anything.

use crate::argot::complete::{longest_common_prefix, CandidateGroup, Completion};
use crate::argot::error::{Error, Result};
use crate::argot::grammar::branch::{CompletionSource, Outcome, Record, Walker};
use crate::argot::grammar::node::{Node, NodeId, NodeKind};
use crate::argot::handler::FieldHandler;
use crate::argot::lexing;
use crate::argot::registry;

/// A tree of nodes describing all accepted argument forms of one command
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    nodes: Vec<Node>,
    /// The unique leaf of the last successful validate; `None` before any
    /// match and after any failed one
    matched_leaf: Option<NodeId>,
    /// User-facing message for the last rejected line
    last_error: Option<String>,
}

impl Grammar {
    /// An empty grammar: a root with no alternatives yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![Node::root()],
            matched_leaf: None,
            last_error: None,
        }
    }

    /// The grammar's registry/display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    /// Attach `node` under `parent` and return its handle.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(Error::NotFound(format!(
                "parent node handle {} in grammar '{}'",
                parent.0, self.name
            )));
        }
        if self.nodes[parent.0].kind.is_leaf() {
            return Err(Error::InvalidParameters(format!(
                "cannot attach '{}' below leaf '{}'",
                node.name, self.nodes[parent.0].name
            )));
        }
        match node.kind {
            NodeKind::Root => {
                return Err(Error::InvalidParameters(
                    "a grammar has exactly one root".to_string(),
                ))
            }
            NodeKind::Normal | NodeKind::Loop if node.handler.is_none() => {
                return Err(Error::InvalidParameters(format!(
                    "node '{}' carries no handler",
                    node.name
                )))
            }
            _ => {}
        }

        let id = NodeId(self.nodes.len());
        let mut node = node;
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Attach a node whose handler is cloned from the global registry.
    ///
    /// Fails with `NotFound` when `handler_name` is unregistered and with
    /// `InvalidParameters` when `kind` is not Normal or Loop.
    pub fn add_registered(
        &mut self,
        parent: NodeId,
        name: &str,
        handler_name: &str,
        kind: NodeKind,
    ) -> Result<NodeId> {
        let handler = registry::create_handler(handler_name)?;
        let node = match kind {
            NodeKind::Normal => Node::normal(name, handler),
            NodeKind::Loop => Node::repeating(name, handler),
            _ => {
                return Err(Error::InvalidParameters(format!(
                    "registry-backed node '{}' must be Normal or Loop",
                    name
                )))
            }
        };
        self.add_child(parent, node)
    }

    /// Terminate one alternative below `parent` with a leaf tagged
    /// `branch_id`.
    pub fn end_branch(&mut self, parent: NodeId, branch_id: impl Into<String>) -> Result<NodeId> {
        self.add_child(parent, Node::leaf(branch_id))
    }

    /// Nearest ancestor of `id` named `name`, looking at most `max_depth`
    /// levels up.
    pub fn ancestor_of(&self, id: NodeId, name: &str, max_depth: usize) -> Option<NodeId> {
        let mut current = self.nodes[id.0].parent;
        let mut depth = 0;
        while let Some(ancestor) = current {
            if depth >= max_depth {
                return None;
            }
            if self.nodes[ancestor.0].name == name {
                return Some(ancestor);
            }
            current = self.nodes[ancestor.0].parent;
            depth += 1;
        }
        None
    }

    /// First child of `id` named `name`; with `recursive`, searches the
    /// whole subtree depth-first in child order.
    pub fn child_of(&self, id: NodeId, name: &str, recursive: bool) -> Option<NodeId> {
        for &child in &self.nodes[id.0].children {
            if self.nodes[child.0].name == name {
                return Some(child);
            }
            if recursive {
                if let Some(found) = self.child_of(child, name, true) {
                    return Some(found);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Registration-time checks
    // ------------------------------------------------------------------

    /// Registration-time structural checks: every non-leaf node has at
    /// least one child (a childless intermediate usually means a missing
    /// `end_branch`), and leaf ids are unique. Runs recursively through
    /// embedded grammars.
    pub fn verify(&self) -> Result<()> {
        let mut leaf_ids: Vec<&str> = Vec::new();
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Leaf { branch_id } => {
                    if leaf_ids.contains(&branch_id.as_str()) {
                        return Err(Error::DuplicateItem(format!(
                            "leaf id '{}' in grammar '{}'",
                            branch_id, self.name
                        )));
                    }
                    leaf_ids.push(branch_id);
                }
                _ => {
                    if node.children.is_empty() {
                        return Err(Error::InvalidState(format!(
                            "node '{}' in grammar '{}' has no children; missing end_branch?",
                            node.name, self.name
                        )));
                    }
                }
            }
            if let Some(FieldHandler::SubGrammar(sub)) = &node.handler {
                sub.verify()?;
            }
        }
        Ok(())
    }

    /// Resolve every handler's ancestor cross-reference to a handle within
    /// this tree instance. Run at registration and again after cloning from
    /// the registry, so a clone never trusts state copied from its
    /// prototype's tree.
    pub fn link(&mut self) -> Result<()> {
        let mut links: Vec<(usize, NodeId)> = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(handler) = &node.handler {
                if let Some(target) = handler.link_target() {
                    let resolved = self
                        .ancestor_of(NodeId(index), target, usize::MAX)
                        .ok_or_else(|| {
                            Error::NotFound(format!(
                                "ancestor '{}' referenced by node '{}' in grammar '{}'",
                                target, node.name, self.name
                            ))
                        })?;
                    links.push((index, resolved));
                }
            }
        }
        for (index, resolved) in links {
            if let Some(handler) = self.nodes[index].handler.as_mut() {
                handler.set_link(resolved);
            }
        }
        for node in &mut self.nodes {
            if let Some(FieldHandler::SubGrammar(sub)) = node.handler.as_mut() {
                sub.link()?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Validate a whole line against the grammar.
    ///
    /// `Ok(true)`: exactly one alternative consumed the whole line; captures
    /// and the matched leaf are committed. `Ok(false)`: the line matched no
    /// alternative, or more than one (ambiguity is always surfaced, never
    /// resolved by declaration order); `last_error` describes which.
    /// `Err(InvalidState)`: ambiguity on *empty* input, which is a defect in
    /// the registered grammar rather than a user mistake.
    pub fn validate(&mut self, line: &str) -> Result<bool> {
        let tokens = lexing::tokenize(line);
        let mut path = Vec::new();
        let mut sources = Vec::new();
        let outcomes = Walker::explore(self, &tokens, 0, None, &mut path, &mut sources);

        let complete: Vec<Outcome> = outcomes
            .into_iter()
            .filter(|outcome| outcome.end == tokens.len())
            .collect();

        self.matched_leaf = None;

        match complete.len() {
            0 => {
                self.last_error = Some(format!(
                    "'{}' does not match '{}'; expected one of: {}",
                    line.trim(),
                    self.name,
                    self.leaf_paths().join(", ")
                ));
                Ok(false)
            }
            1 => {
                let outcome = complete.into_iter().next().ok_or_else(|| {
                    Error::InvalidState("completed branch disappeared".to_string())
                })?;
                self.clear_captures();
                self.apply_records(&outcome.records, &tokens);
                self.matched_leaf = Some(outcome.leaf);
                self.last_error = None;
                Ok(true)
            }
            _ => {
                let paths: Vec<String> = complete
                    .iter()
                    .map(|outcome| self.leaf_path(outcome.leaf))
                    .collect();
                if tokens.is_empty() {
                    return Err(Error::InvalidState(format!(
                        "grammar '{}' is ambiguous on empty input: {}",
                        self.name,
                        paths.join(" | ")
                    )));
                }
                self.last_error = Some(format!(
                    "'{}' is ambiguous in '{}'; matches: {}",
                    line.trim(),
                    self.name,
                    paths.join(" | ")
                ));
                Ok(false)
            }
        }
    }

    /// Compute autocomplete output for a partial line.
    ///
    /// The final (possibly empty) token is treated as partial; every node
    /// reached once the committed tokens are consumed contributes its
    /// candidates. One contributing node completes via longest common
    /// prefix; several are a genuine syntactic fork and stay grouped.
    /// Committed captures are never touched.
    pub fn prompt(&self, line: &str) -> Completion {
        let (tokens, partial) = lexing::tokenize_partial(line);
        let mut path = Vec::new();
        let mut sources = Vec::new();
        let _ = Walker::explore(self, &tokens, 0, Some(partial.as_str()), &mut path, &mut sources);

        let groups = group_sources(sources);
        match groups.len() {
            0 => Completion::None,
            1 => {
                let lcp = longest_common_prefix(&groups[0].candidates);
                if lcp.len() > partial.len() && lcp.starts_with(&partial) {
                    Completion::Suffix(lcp[partial.len()..].to_string())
                } else {
                    Completion::Candidates(groups)
                }
            }
            _ => Completion::Candidates(groups),
        }
    }

    /// Flattened first-token candidates, used when this grammar is embedded
    /// as a field handler and asked for suggestions directly.
    pub(crate) fn first_candidates(&self, partial: &str) -> Vec<String> {
        let tokens: Vec<String> = Vec::new();
        let mut path = Vec::new();
        let mut sources = Vec::new();
        let _ = Walker::explore(self, &tokens, 0, Some(partial), &mut path, &mut sources);

        let mut candidates = Vec::new();
        for source in sources {
            for candidate in source.candidates {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    // ------------------------------------------------------------------
    // Captures
    // ------------------------------------------------------------------

    /// Branch id of the leaf the last successful validate ended at
    pub fn matched_leaf_id(&self) -> Result<&str> {
        let leaf = self.require_matched()?;
        match &self.nodes[leaf.0].kind {
            NodeKind::Leaf { branch_id } => Ok(branch_id),
            _ => Err(Error::InvalidState(
                "matched handle is not a leaf".to_string(),
            )),
        }
    }

    /// Token captured by the Normal node named `name`.
    ///
    /// `Ok(None)` when the node exists but sat on a losing alternative.
    pub fn captured_value(&self, name: &str) -> Result<Option<&str>> {
        self.require_matched()?;
        let id = self.named(name)?;
        match self.nodes[id.0].kind {
            NodeKind::Normal => Ok(self.nodes[id.0].value.as_deref()),
            _ => Err(Error::InvalidParameters(format!(
                "node '{}' does not capture a single value",
                name
            ))),
        }
    }

    /// Ordered tokens captured by the Loop node named `name`
    pub fn captured_values(&self, name: &str) -> Result<&[String]> {
        self.require_matched()?;
        let id = self.named(name)?;
        match self.nodes[id.0].kind {
            NodeKind::Loop => Ok(&self.nodes[id.0].values),
            _ => Err(Error::InvalidParameters(format!(
                "node '{}' does not capture a value list",
                name
            ))),
        }
    }

    /// The embedded grammar at the node named `name`, for recursive capture
    /// queries (its own matched leaf and captures reflect the last match).
    pub fn sub_grammar(&self, name: &str) -> Result<&Grammar> {
        self.require_matched()?;
        let id = self.named(name)?;
        match &self.nodes[id.0].handler {
            Some(FieldHandler::SubGrammar(sub)) => Ok(sub),
            _ => Err(Error::InvalidParameters(format!(
                "node '{}' does not embed a grammar",
                name
            ))),
        }
    }

    /// Message for the most recent rejected line, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ------------------------------------------------------------------
    // Error-reporting surface
    // ------------------------------------------------------------------

    /// Every valid alternative as a space-joined node-name path, one per
    /// leaf, in declaration order. Loop nodes are marked with `...`.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.kind.is_leaf() {
                paths.push(self.leaf_path(NodeId(index)));
            }
        }
        paths
    }

    fn leaf_path(&self, leaf: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = self.nodes[leaf.0].parent;
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            match node.kind {
                NodeKind::Root => break,
                NodeKind::Loop => names.push(format!("{}...", node.name)),
                _ => names.push(node.name.clone()),
            }
            current = node.parent;
        }
        names.reverse();
        names.join(" ")
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    fn require_matched(&self) -> Result<NodeId> {
        self.matched_leaf.ok_or_else(|| {
            Error::InvalidState(format!(
                "grammar '{}' has no matched alternative; validate first",
                self.name
            ))
        })
    }

    fn named(&self, name: &str) -> Result<NodeId> {
        self.child_of(self.root(), name, true)
            .ok_or_else(|| Error::NotFound(format!("node '{}' in grammar '{}'", name, self.name)))
    }

    fn clear_captures(&mut self) {
        for node in &mut self.nodes {
            node.value = None;
            node.values.clear();
            if let Some(FieldHandler::SubGrammar(sub)) = node.handler.as_mut() {
                sub.clear_captures();
                sub.matched_leaf = None;
            }
        }
    }

    /// Replay one chosen branch's record list onto the tree. This is the
    /// only place node captures are written.
    fn apply_records(&mut self, records: &[Record], tokens: &[String]) {
        for record in records {
            match record {
                Record::Token { node, index } => {
                    self.capture(*node, tokens[*index].clone());
                }
                Record::Sub {
                    node,
                    start,
                    end,
                    leaf,
                    records,
                } => {
                    self.capture(*node, tokens[*start..*end].join(" "));
                    if let Some(FieldHandler::SubGrammar(sub)) =
                        self.nodes[node.0].handler.as_mut()
                    {
                        // A loop over a sub-grammar commits the last
                        // iteration into the embedded tree
                        sub.clear_captures();
                        sub.apply_records(records, tokens);
                        sub.matched_leaf = Some(*leaf);
                    }
                }
            }
        }
    }

    fn capture(&mut self, id: NodeId, token: String) {
        let node = &mut self.nodes[id.0];
        match node.kind {
            NodeKind::Loop => node.values.push(token),
            _ => node.value = Some(token),
        }
    }
}

fn group_sources(sources: Vec<CompletionSource>) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    for source in sources {
        if source.candidates.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|group| group.source == source.path) {
            Some(group) => {
                for candidate in source.candidates {
                    if !group.candidates.contains(&candidate) {
                        group.candidates.push(candidate);
                    }
                }
            }
            None => groups.push(CandidateGroup {
                source: source.path,
                candidates: source.candidates,
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> dir(one-of north/south) -> leaf "0"
    fn compass() -> Grammar {
        let mut g = Grammar::new("compass");
        let root = g.root();
        let dir = g
            .add_child(root, Node::normal("dir", FieldHandler::one_of(["north", "south"])))
            .unwrap();
        g.end_branch(dir, "0").unwrap();
        g
    }

    #[test]
    fn test_validate_commits_capture() {
        let mut g = compass();
        assert_eq!(g.validate("north").unwrap(), true);
        assert_eq!(g.matched_leaf_id().unwrap(), "0");
        assert_eq!(g.captured_value("dir").unwrap(), Some("north"));
    }

    #[test]
    fn test_failed_validate_resets_match_state_only() {
        let mut g = compass();
        assert!(g.validate("north").unwrap());
        assert!(!g.validate("upward").unwrap());
        // Matched state is gone, captures from the previous success are not
        assert!(matches!(g.matched_leaf_id(), Err(Error::InvalidState(_))));
        assert!(g.last_error().unwrap().contains("expected one of"));
    }

    #[test]
    fn test_failed_validate_leaves_captures_untouched() {
        let mut g = compass();
        assert!(g.validate("north").unwrap());
        assert!(!g.validate("upward").unwrap());
        let dir = g.child_of(g.root(), "dir", true).unwrap();
        // Losing attempts never write anything durable
        assert_eq!(g.nodes[dir.0].value.as_deref(), Some("north"));
    }

    #[test]
    fn test_captures_before_any_validate_are_invalid_state() {
        let g = compass();
        assert!(matches!(g.captured_value("dir"), Err(Error::InvalidState(_))));
        assert!(matches!(g.matched_leaf_id(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_unknown_node_name_is_not_found() {
        let mut g = compass();
        g.validate("north").unwrap();
        assert!(matches!(g.captured_value("speed"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_verify_rejects_childless_intermediate() {
        let mut g = Grammar::new("broken");
        let root = g.root();
        g.add_child(root, Node::normal("dir", FieldHandler::literal("x")))
            .unwrap();
        // No end_branch below 'dir'
        assert!(matches!(g.verify(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_verify_rejects_duplicate_leaf_ids() {
        let mut g = Grammar::new("dup");
        let root = g.root();
        let a = g
            .add_child(root, Node::normal("a", FieldHandler::literal("a")))
            .unwrap();
        g.end_branch(a, "0").unwrap();
        let b = g
            .add_child(root, Node::normal("b", FieldHandler::literal("b")))
            .unwrap();
        g.end_branch(b, "0").unwrap();
        assert!(matches!(g.verify(), Err(Error::DuplicateItem(_))));
    }

    #[test]
    fn test_add_child_below_leaf_is_rejected() {
        let mut g = compass();
        let leaf = g.child_of(g.root(), "0", true).unwrap();
        let err = g
            .add_child(leaf, Node::normal("x", FieldHandler::boolean()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
    }

    #[test]
    fn test_ancestor_lookup_respects_max_depth() {
        let mut g = Grammar::new("deep");
        let root = g.root();
        let a = g
            .add_child(root, Node::normal("a", FieldHandler::any_word()))
            .unwrap();
        let b = g
            .add_child(a, Node::normal("b", FieldHandler::any_word()))
            .unwrap();
        let c = g
            .add_child(b, Node::normal("c", FieldHandler::any_word()))
            .unwrap();
        assert_eq!(g.ancestor_of(c, "a", 2), Some(a));
        assert_eq!(g.ancestor_of(c, "a", 1), None);
    }

    #[test]
    fn test_leaf_paths_mark_loops() {
        let mut g = Grammar::new("walk");
        let root = g.root();
        let verb = g
            .add_child(root, Node::normal("verb", FieldHandler::literal("go")))
            .unwrap();
        let steps = g
            .add_child(verb, Node::repeating("steps", FieldHandler::decimal(0.0, 9.0).unwrap()))
            .unwrap();
        g.end_branch(steps, "0").unwrap();
        assert_eq!(g.leaf_paths(), vec!["verb steps..."]);
    }
}
