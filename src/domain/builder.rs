//! Forest builder: turns seed data into an arena with position-encoded ids.

use std::collections::VecDeque;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TopicArena;
use crate::domain::entities::SeedTopic;
use crate::domain::error::{DomainError, DomainResult};

/// Constructs topic forests from seed topics.
pub struct ForestBuilder {
    default_topic: String,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new(crate::domain::DEFAULT_TOPIC)
    }
}

impl ForestBuilder {
    /// A blank `default_topic` falls back to the built-in one.
    pub fn new(default_topic: impl Into<String>) -> Self {
        let default_topic = default_topic.into();
        let default_topic = match default_topic.trim() {
            "" => crate::domain::DEFAULT_TOPIC.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self { default_topic }
    }

    /// Build a forest, rejecting empty or malformed seeds.
    #[instrument(level = "debug", skip(self, seeds))]
    pub fn build(&self, seeds: &[SeedTopic]) -> DomainResult<TopicArena> {
        if seeds.is_empty() {
            return Err(DomainError::InvalidSeed("no seed topics".to_string()));
        }
        for seed in seeds {
            seed.validate()?;
        }

        let mut arena = TopicArena::new();
        // Breadth-first keeps sibling insertion order, so ids match positions
        let mut queue: VecDeque<(&SeedTopic, Option<Index>)> =
            seeds.iter().map(|seed| (seed, None)).collect();

        while let Some((seed, parent_idx)) = queue.pop_front() {
            let idx = arena
                .insert_node(seed.prompt.clone(), parent_idx)
                .ok_or_else(|| DomainError::InconsistentTree("seed parent vanished".to_string()))?;
            queue.extend(seed.children.iter().map(|child| (child, Some(idx))));
        }

        debug!("build: {} topics in {} roots", arena.len(), arena.roots().len());
        Ok(arena)
    }

    /// Forest holding only the default topic.
    pub fn build_default(&self) -> TopicArena {
        let mut arena = TopicArena::new();
        arena.insert_node(self.default_topic.clone(), None);
        arena
    }

    /// Build from seeds, substituting the default forest when they are
    /// absent, empty or malformed.
    pub fn build_or_default(&self, seeds: Option<&[SeedTopic]>) -> TopicArena {
        match seeds.map(|s| self.build(s)) {
            Some(Ok(arena)) => arena,
            Some(Err(e)) => {
                tracing::warn!("Falling back to default topic: {}", e);
                self.build_default()
            }
            None => self.build_default(),
        }
    }

    /// Parse seed JSON (a list of topics) and build, falling back to the
    /// default forest on any error.
    pub fn build_from_json(&self, json: &str) -> TopicArena {
        match serde_json::from_str::<Vec<SeedTopic>>(json) {
            Ok(seeds) => self.build_or_default(Some(&seeds)),
            Err(e) => {
                tracing::warn!("Falling back to default topic, unreadable seed: {}", e);
                self.build_default()
            }
        }
    }
}
