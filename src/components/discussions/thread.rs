//! Turns flat or nested reply collections into a flat render list with depths.

use super::models::Reply;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Indentation per nesting level, in pixels
pub const INDENT_PX: u32 = 16;

/// One reply in render order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadLine<'a> {
    pub reply: &'a Reply,
    pub depth: usize,
}

impl ThreadLine<'_> {
    pub fn indent_px(&self) -> u32 {
        self.depth as u32 * INDENT_PX
    }
}

/// Flatten server-nested replies, filling in the parent id from the nesting.
///
/// A reply seen twice keeps its first occurrence.
pub fn flatten_replies(replies: &[Reply]) -> Vec<Reply> {
    let mut flat = Vec::new();
    let mut seen = HashSet::new();
    // (reply, parent inferred from nesting), pushed in reverse to pop in order
    let mut stack: Vec<(&Reply, Option<i64>)> = replies.iter().rev().map(|r| (r, None)).collect();

    while let Some((reply, nested_parent)) = stack.pop() {
        if !seen.insert(reply.id) {
            continue;
        }
        let mut copy = reply.clone();
        copy.replies = Vec::new();
        if copy.parent_id.is_none() {
            copy.parent_id = nested_parent;
        }
        flat.push(copy);
        stack.extend(reply.replies.iter().rev().map(|child| (child, Some(reply.id))));
    }
    flat
}

/// Depth-first render order: each reply followed by its children, siblings in server order.
///
/// Replies whose parent is missing render as top-level. Replies caught in a parent cycle
/// are appended as top-level once the rest is laid out.
pub fn assemble_thread(replies: &[Reply]) -> Vec<ThreadLine<'_>> {
    let ids: HashSet<i64> = replies.iter().map(|r| r.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<usize>> = HashMap::new();

    for (index, reply) in replies.iter().enumerate() {
        match reply.parent_id {
            Some(parent) if parent != reply.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(index)
            }
            Some(parent) if parent != reply.id => {
                warn!("Reply {} points at missing parent {}", reply.id, parent);
                roots.push(index)
            }
            _ => roots.push(index),
        }
    }

    let mut lines = Vec::with_capacity(replies.len());
    let mut visited = HashSet::new();
    walk(replies, &roots, &children, &mut visited, &mut lines);

    if lines.len() < replies.len() {
        let leftover: Vec<usize> = (0..replies.len())
            .filter(|i| !visited.contains(&replies[*i].id))
            .collect();
        warn!("Breaking a reply cycle involving {} replies", leftover.len());
        for index in leftover {
            if !visited.contains(&replies[index].id) {
                walk(replies, &[index], &children, &mut visited, &mut lines);
            }
        }
    }
    lines
}

fn walk<'a>(
    replies: &'a [Reply],
    roots: &[usize],
    children: &HashMap<i64, Vec<usize>>,
    visited: &mut HashSet<i64>,
    lines: &mut Vec<ThreadLine<'a>>,
) {
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|i| (*i, 0)).collect();
    while let Some((index, depth)) = stack.pop() {
        let reply = &replies[index];
        if !visited.insert(reply.id) {
            continue;
        }
        lines.push(ThreadLine { reply, depth });
        if let Some(kids) = children.get(&reply.id) {
            stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
        }
    }
}
