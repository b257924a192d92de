//! Relation text → edges.
//!
//! The text comes straight from a live-editing box, so half-typed lines are normal. Anything
//! that is not `<left> => <right>` with two non-empty sides is skipped without an error.

use std::sync::OnceLock;

use regex::Regex;

use super::Edge;

fn relation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Non-greedy left side: `A => B => C` relates `A` to `B => C`.
    RE.get_or_init(|| Regex::new(r"^(.*?)=>(.*)$").expect("relation regex must compile"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingSeparator,
    EmptySide,
}

/// A non-blank line that did not produce an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based line number in the source text.
    pub line: usize,
    pub text: String,
    pub reason: DropReason,
}

pub fn parse_edges(text: &str) -> Vec<Edge> {
    parse_edges_with_diagnostics(text).0
}

/// Like [`parse_edges`], but also reports every skipped line so an editor can mark it.
pub fn parse_edges_with_diagnostics(text: &str) -> (Vec<Edge>, Vec<DroppedLine>) {
    let mut edges = Vec::new();
    let mut dropped = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(edge) => edges.push(edge),
            Err(reason) => {
                tracing::trace!(line = idx + 1, text = line, ?reason, "skipping relation line");
                dropped.push(DroppedLine {
                    line: idx + 1,
                    text: line.to_string(),
                    reason,
                });
            }
        }
    }

    (edges, dropped)
}

fn parse_line(line: &str) -> Result<Edge, DropReason> {
    let caps = relation_re()
        .captures(line)
        .ok_or(DropReason::MissingSeparator)?;
    let left = caps.get(1).map_or("", |m| m.as_str()).trim();
    let right = caps.get(2).map_or("", |m| m.as_str()).trim();
    if left.is_empty() || right.is_empty() {
        return Err(DropReason::EmptySide);
    }
    Ok(Edge::new(left, right))
}
