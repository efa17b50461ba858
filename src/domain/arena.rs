use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::topic_id::TopicId;

/// Tree node in the arena-based topic forest.
#[derive(Debug)]
pub struct Topic {
    /// Display text, never blank
    pub prompt: String,
    /// Position-encoded id, assigned once at insertion
    pub id: TopicId,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

impl Topic {
    /// Id of the owning topic, derived from this topic's position.
    pub fn parent_id(&self) -> Option<TopicId> {
        self.id.parent()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.prompt, self.id)
    }
}

/// Arena-based forest of topics.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Nodes are only ever appended, so every id stays valid for the arena's
/// lifetime.
#[derive(Debug, Default)]
pub struct TopicArena {
    /// Arena storage for all topics
    arena: Arena<Topic>,
    /// Root indices in forest order
    roots: Vec<Index>,
}

impl TopicArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a topic as the last child of `parent`, or as the last root.
    ///
    /// Returns `None` when `parent` is not a live node.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, prompt: String, parent: Option<Index>) -> Option<Index> {
        let id = match parent {
            Some(parent_idx) => {
                let parent_node = self.arena.get(parent_idx)?;
                parent_node.id.child(parent_node.children.len())
            }
            None => TopicId::root(self.roots.len()),
        };

        let node_idx = self.arena.insert(Topic {
            prompt,
            id,
            parent,
            children: Vec::new(),
        });

        match parent.and_then(|idx| self.arena.get_mut(idx)) {
            Some(parent_node) => parent_node.children.push(node_idx),
            None => self.roots.push(node_idx),
        }

        Some(node_idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&Topic> {
        self.arena.get(idx)
    }

    /// Node behind an index handed out by this arena.
    ///
    /// Panics on a foreign index; nodes are never removed, so indices
    /// returned by `insert_node` stay valid.
    pub fn node(&self, idx: Index) -> &Topic {
        &self.arena[idx]
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Resolve an id by walking its segments from the forest down.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, id: &TopicId) -> Option<Index> {
        let (first, rest) = id.segments().split_first()?;
        let mut current = *self.roots.get(*first)?;
        for &segment in rest {
            current = *self.get_node(current)?.children.get(segment)?;
        }
        Some(current)
    }

    /// Depth-first, pre-order iteration over every root in forest order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Depth-first, pre-order iteration over the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, vec![start])
    }

    /// Number of levels of the deepest branch (0 for an empty forest).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TopicArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TopicArena, stack: Vec<Index>) -> Self {
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a Topic);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TopicArena, Index, Index) {
        let mut arena = TopicArena::new();
        let movies = arena.insert_node("Movies".into(), None).unwrap();
        let scifi = arena.insert_node("Sci-Fi".into(), Some(movies)).unwrap();
        arena.insert_node("Comedy".into(), Some(movies)).unwrap();
        arena.insert_node("Dune".into(), Some(scifi)).unwrap();
        arena.insert_node("Music".into(), None).unwrap();
        (arena, movies, scifi)
    }

    #[test]
    fn given_inserts_when_ids_assigned_then_follow_positions() {
        let (arena, _, scifi) = sample();
        let ids: Vec<String> = arena.iter().map(|(_, t)| t.id.to_string()).collect();
        assert_eq!(ids, vec!["0", "0-0", "0-0-0", "0-1", "1"]);
        assert_eq!(arena.get_node(scifi).unwrap().parent_id(), Some(TopicId::root(0)));
    }

    #[test]
    fn given_id_when_resolved_then_walks_segments() {
        let (arena, _, scifi) = sample();
        assert_eq!(arena.resolve(&"0-0".parse().unwrap()), Some(scifi));
        assert_eq!(arena.resolve(&"0-5".parse().unwrap()), None);
        assert_eq!(arena.resolve(&"7".parse().unwrap()), None);
    }

    #[test]
    fn given_forest_when_depth_then_longest_branch() {
        let (arena, _, _) = sample();
        assert_eq!(arena.depth(), 3);
        assert_eq!(TopicArena::new().depth(), 0);
        assert_eq!(arena.len(), 5);
    }
}
