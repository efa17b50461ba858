//! Topic tree controller: cursor navigation and append-only mutation.

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{Topic, TopicArena};
use crate::domain::builder::ForestBuilder;
use crate::domain::entities::{NavigationFlags, NewTopic, PathEntry, SeedTopic, TopicSnapshot};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::topic_id::{ParentRef, TopicId};

/// Owns the topic forest, the cursor and the back-navigation history.
///
/// Every operation either succeeds completely or leaves forest, cursor and
/// history untouched.
#[derive(Debug)]
pub struct TopicTreeController {
    forest: TopicArena,
    /// Always a live index into `forest`
    cursor: Index,
    history: Vec<ParentRef>,
}

impl TopicTreeController {
    /// Build from seed topics, using the built-in default topic as fallback.
    pub fn new(seeds: Option<Vec<SeedTopic>>) -> Self {
        Self::with_default(seeds, crate::domain::DEFAULT_TOPIC)
    }

    /// Build from seed topics; absent, empty or malformed seeds yield a
    /// single root named `default_topic`.
    pub fn with_default(seeds: Option<Vec<SeedTopic>>, default_topic: &str) -> Self {
        let builder = ForestBuilder::new(default_topic);
        let forest = builder.build_or_default(seeds.as_deref());
        Self::from_forest(forest, &builder)
    }

    /// Build from seed JSON; unparseable input yields the default forest.
    pub fn from_json(json: &str, default_topic: &str) -> Self {
        let builder = ForestBuilder::new(default_topic);
        let forest = builder.build_from_json(json);
        Self::from_forest(forest, &builder)
    }

    fn from_forest(forest: TopicArena, builder: &ForestBuilder) -> Self {
        let forest = if forest.roots().is_empty() {
            builder.build_default()
        } else {
            forest
        };
        let cursor = forest.roots()[0];
        let history = vec![ParentRef::Topic(forest.node(cursor).id.clone())];
        debug!("init: {} topics, cursor={}", forest.len(), forest.node(cursor).id);
        Self {
            forest,
            cursor,
            history,
        }
    }

    pub fn current(&self) -> &Topic {
        self.forest.node(self.cursor)
    }

    pub fn current_id(&self) -> &TopicId {
        &self.current().id
    }

    pub fn history(&self) -> &[ParentRef] {
        &self.history
    }

    pub fn forest(&self) -> &TopicArena {
        &self.forest
    }

    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Resolve an id by decoding its path from the indicated root.
    pub fn lookup_by_id(&self, id: &TopicId) -> Option<&Topic> {
        self.forest.resolve(id).map(|idx| self.forest.node(idx))
    }

    pub fn roots(&self) -> Vec<&Topic> {
        self.forest
            .roots()
            .iter()
            .map(|&root| self.forest.node(root))
            .collect()
    }

    /// Children of the given topic, in order; empty for unknown ids.
    pub fn children_of(&self, id: &TopicId) -> Vec<&Topic> {
        self.forest
            .resolve(id)
            .map(|idx| {
                self.forest
                    .node(idx)
                    .children
                    .iter()
                    .map(|&child| self.forest.node(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move to the next sibling, wrapping around; roots cycle among roots.
    ///
    /// Returns whether the cursor moved. A parent that cannot be resolved is
    /// an internal inconsistency and reported as an error.
    #[instrument(level = "debug", skip(self))]
    pub fn advance_sibling(&mut self) -> DomainResult<bool> {
        let current = self.current();
        let siblings: &[Index] = match current.parent_id() {
            None => self.forest.roots(),
            Some(parent_id) => {
                let parent_idx = self.forest.resolve(&parent_id).ok_or_else(|| {
                    DomainError::InconsistentTree(format!(
                        "parent {} of {} not found",
                        parent_id, current.id
                    ))
                })?;
                &self.forest.node(parent_idx).children
            }
        };
        if siblings.len() < 2 {
            debug!("advance_sibling: no other siblings for {}", current.id);
            return Ok(false);
        }

        let next = siblings[(current.id.last_index() + 1) % siblings.len()];
        self.cursor = next;
        debug!("advance_sibling: cursor={}", self.current_id());
        Ok(true)
    }

    /// Move to the first child, remembering the current topic.
    #[instrument(level = "debug", skip(self))]
    pub fn descend(&mut self) -> bool {
        let current = self.current();
        let Some(&first_child) = current.children.first() else {
            debug!("descend: {} is a leaf", current.id);
            return false;
        };
        let remembered = ParentRef::Topic(current.id.clone());
        self.history.push(remembered);
        self.cursor = first_child;
        debug!("descend: cursor={}", self.current_id());
        true
    }

    /// Return to the most recently remembered topic.
    ///
    /// No-op at a root, with empty history, or when the remembered entry
    /// does not resolve.
    #[instrument(level = "debug", skip(self))]
    pub fn ascend(&mut self) -> bool {
        if self.current().id.is_root() {
            return false;
        }
        let Some(entry) = self.history.last() else {
            return false;
        };
        let Some(target) = entry.topic_id().and_then(|id| self.forest.resolve(id)) else {
            debug!("ascend: history entry {} does not resolve", entry);
            return false;
        };
        self.history.pop();
        self.cursor = target;
        debug!("ascend: cursor={}", self.current_id());
        true
    }

    /// Jump to a topic found by depth-first search over all roots.
    ///
    /// History is left alone; an unknown id leaves the cursor unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn switch_to(&mut self, id: &TopicId) -> bool {
        match self.forest.iter().find(|(_, topic)| &topic.id == id) {
            Some((idx, _)) => {
                self.cursor = idx;
                true
            }
            None => {
                debug!("switch_to: {} not found", id);
                false
            }
        }
    }

    /// Append leaf topics under `parent` (or as new roots), move the cursor
    /// to the first of them and remember `parent`.
    ///
    /// Returns the ids assigned to the new topics.
    #[instrument(level = "debug", skip(self, topics), fields(count = topics.len()))]
    pub fn append_children(
        &mut self,
        parent: &ParentRef,
        topics: Vec<NewTopic>,
    ) -> DomainResult<Vec<TopicId>> {
        if topics.is_empty() {
            return Err(DomainError::EmptyTopics(parent.to_string()));
        }
        if topics.iter().any(|t| t.prompt.trim().is_empty()) {
            return Err(DomainError::BlankPrompt);
        }
        let parent_idx = match parent {
            ParentRef::Root => None,
            ParentRef::Topic(id) => Some(
                self.forest
                    .resolve(id)
                    .ok_or_else(|| DomainError::ParentNotFound(id.to_string()))?,
            ),
        };

        let mut appended = Vec::with_capacity(topics.len());
        for topic in topics {
            let idx = self
                .forest
                .insert_node(topic.prompt.trim().to_string(), parent_idx)
                .ok_or_else(|| DomainError::ParentNotFound(parent.to_string()))?;
            appended.push(idx);
        }

        self.cursor = appended[0];
        self.history.push(parent.clone());
        let ids: Vec<TopicId> = appended
            .iter()
            .map(|&idx| self.forest.node(idx).id.clone())
            .collect();
        debug!("append_children: {} new under {}, cursor={}", ids.len(), parent, ids[0]);
        Ok(ids)
    }

    /// Ancestors of `id` from the root down to its parent.
    ///
    /// Only the first root's tree is searched; targets elsewhere yield an
    /// empty path.
    #[instrument(level = "debug", skip(self))]
    pub fn path_to_root(&self, id: &TopicId) -> Vec<PathEntry> {
        let Some(&first_root) = self.forest.roots().first() else {
            return Vec::new();
        };
        let Some((target, _)) = self
            .forest
            .iter_from(first_root)
            .find(|(_, topic)| &topic.id == id)
        else {
            return Vec::new();
        };

        let mut path = Vec::new();
        let mut next = self.forest.node(target).parent;
        while let Some(idx) = next {
            let topic = self.forest.node(idx);
            path.push(PathEntry {
                prompt: topic.prompt.clone(),
                id: topic.id.clone(),
            });
            next = topic.parent;
        }
        path.reverse();
        path
    }

    /// `path_to_root` followed by the topic itself: the path handed to the
    /// generators.
    pub fn full_path(&self, id: &TopicId) -> Vec<PathEntry> {
        let mut path = self.path_to_root(id);
        match self.lookup_by_id(id) {
            Some(topic) => path.push(PathEntry {
                prompt: topic.prompt.clone(),
                id: topic.id.clone(),
            }),
            None => warn!("full_path: {} not found", id),
        }
        path
    }

    pub fn is_at_top(&self) -> bool {
        self.current().parent.is_none()
    }

    pub fn is_at_bottom(&self) -> bool {
        self.current().is_leaf()
    }

    pub fn can_descend(&self) -> bool {
        !self.is_at_bottom()
    }

    pub fn can_ascend(&self) -> bool {
        !self.is_at_top()
    }

    pub fn flags(&self) -> NavigationFlags {
        NavigationFlags {
            is_at_top: self.is_at_top(),
            is_at_bottom: self.is_at_bottom(),
            can_descend: self.can_descend(),
            can_ascend: self.can_ascend(),
        }
    }

    /// Owned nested copy of the whole forest.
    pub fn snapshot(&self) -> Vec<TopicSnapshot> {
        self.forest
            .roots()
            .iter()
            .map(|&root| self.snapshot_node(root))
            .collect()
    }

    fn snapshot_node(&self, idx: Index) -> TopicSnapshot {
        let topic = self.forest.node(idx);
        TopicSnapshot {
            prompt: topic.prompt.clone(),
            id: topic.id.clone(),
            parent_id: topic.parent_id(),
            children: topic
                .children
                .iter()
                .map(|&child| self.snapshot_node(child))
                .collect(),
        }
    }
}

impl Default for TopicTreeController {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> TopicTreeController {
        TopicTreeController::new(Some(vec![SeedTopic::with_children(
            "Movies",
            vec![SeedTopic::new("Sci-Fi")],
        )]))
    }

    fn id(raw: &str) -> TopicId {
        raw.parse().unwrap()
    }

    #[test]
    fn given_seed_when_initialized_then_cursor_on_first_root() {
        let tree = movies();
        assert_eq!(tree.current_id().to_string(), "0");
        assert_eq!(tree.history(), &[ParentRef::Topic(id("0"))]);
        assert!(tree.is_at_top());
        assert!(tree.can_descend());
    }

    #[test]
    fn given_no_seed_when_initialized_then_single_default_root() {
        let tree = TopicTreeController::new(None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.current().prompt, crate::domain::DEFAULT_TOPIC);
    }

    #[test]
    fn given_root_when_descend_then_history_pushes_cursor() {
        let mut tree = movies();
        assert!(tree.descend());
        assert_eq!(tree.current_id(), &id("0-0"));
        assert_eq!(
            tree.history(),
            &[ParentRef::Topic(id("0")), ParentRef::Topic(id("0"))]
        );
    }

    #[test]
    fn given_leaf_when_descend_then_noop() {
        let mut tree = movies();
        tree.descend();
        let history_len = tree.history().len();
        assert!(!tree.descend());
        assert_eq!(tree.current_id(), &id("0-0"));
        assert_eq!(tree.history().len(), history_len);
    }

    #[test]
    fn given_root_when_ascend_then_noop() {
        let mut tree = movies();
        assert!(!tree.ascend());
        assert_eq!(tree.history().len(), 1);
    }

    #[test]
    fn given_single_root_when_advance_sibling_then_noop() {
        let mut tree = movies();
        assert_eq!(tree.advance_sibling(), Ok(false));
        assert_eq!(tree.current_id(), &id("0"));
    }

    #[test]
    fn given_unknown_parent_when_append_then_parent_not_found_and_unchanged() {
        let mut tree = movies();
        let result = tree.append_children(&ParentRef::Topic(id("4-2")), vec![NewTopic::new("x")]);
        assert_eq!(result, Err(DomainError::ParentNotFound("4-2".into())));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.current_id(), &id("0"));
        assert_eq!(tree.history().len(), 1);
    }

    #[test]
    fn given_empty_topics_when_append_then_error() {
        let mut tree = movies();
        assert!(matches!(
            tree.append_children(&ParentRef::Topic(id("0")), vec![]),
            Err(DomainError::EmptyTopics(_))
        ));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_root_sentinel_when_append_then_new_roots() {
        let mut tree = movies();
        let ids = tree
            .append_children(&ParentRef::Root, vec![NewTopic::new("Music"), NewTopic::new("Art")])
            .unwrap();
        assert_eq!(ids, vec![id("1"), id("2")]);
        assert_eq!(tree.current_id(), &id("1"));
        assert_eq!(tree.history().last(), Some(&ParentRef::Root));
        assert!(tree.is_at_top());
    }

    #[test]
    fn given_snapshot_when_taken_then_mirrors_forest() {
        let tree = movies();
        let snapshot = tree.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].children[0].parent_id, Some(id("0")));
        assert_eq!(snapshot[0].children[0].prompt, "Sci-Fi");
    }
}
