//! Autocomplete result model.
//!
//! A prompt over a partial line either finds nothing, finds a single
//! completion source whose candidates share an extendable prefix (the unseen
//! suffix is returned), or finds one or more candidate lists. Candidate lists
//! from distinct sources are a genuine syntactic fork and are kept grouped by
//! their source path, never merged.

use serde::Serialize;

/// One completion source and its suggestions.
///
/// `source` is the node-name path from the grammar root down to the node that
/// produced the candidates, joined with spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateGroup {
    pub source: String,
    pub candidates: Vec<String>,
}

/// Outcome of prompting a grammar with a partial line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Completion {
    /// No node could suggest anything for the partial token
    None,
    /// A unique extension: the characters to append to the partial token
    Suffix(String),
    /// Candidate lists, grouped by the node that produced them
    Candidates(Vec<CandidateGroup>),
}

/// Longest common prefix of a non-empty candidate list.
pub fn longest_common_prefix(candidates: &[String]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };

    let mut prefix_len = first.len();
    for candidate in &candidates[1..] {
        let common = first
            .bytes()
            .zip(candidate.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        prefix_len = prefix_len.min(common);
    }

    // Byte-wise matching can split a multi-byte character; back off to the
    // nearest char boundary.
    while !first.is_char_boundary(prefix_len) {
        prefix_len -= 1;
    }

    first[..prefix_len].to_string()
}
