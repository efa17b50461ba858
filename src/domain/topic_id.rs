//! Position-encoded topic identifiers.
//!
//! A topic id is the list of indices leading from the forest to the node:
//! root index first, then one child index per level, rendered dash-joined
//! (`"2-0-1"`).

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

/// Reserved pseudo-parent naming the forest itself.
pub const ROOT_SENTINEL: &str = "root";

/// Path-encoded identifier of a topic.
///
/// Never empty: the first segment is the root index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(Vec<usize>);

impl TopicId {
    /// Id of the root at `index`.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Id of this topic's child at `index`.
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// Id of the owning topic, `None` for roots.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Position of the topic among its siblings.
    pub fn last_index(&self) -> usize {
        // segments are never empty
        self.0.last().copied().unwrap_or_default()
    }

    /// Number of ancestors (0 for roots).
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("-"))
    }
}

impl FromStr for TopicId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTopicId(s.to_string()));
        }
        trimmed
            .split('-')
            .map(|segment| segment.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| DomainError::InvalidTopicId(s.to_string()))
    }
}

impl Serialize for TopicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Target of an append and entry of the navigation history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// The forest itself: appended topics become new roots.
    Root,
    Topic(TopicId),
}

impl ParentRef {
    pub fn topic_id(&self) -> Option<&TopicId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Topic(id) => Some(id),
        }
    }
}

impl From<TopicId> for ParentRef {
    fn from(id: TopicId) -> Self {
        ParentRef::Topic(id)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => write!(f, "{ROOT_SENTINEL}"),
            ParentRef::Topic(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ParentRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == ROOT_SENTINEL {
            Ok(ParentRef::Root)
        } else {
            s.parse().map(ParentRef::Topic)
        }
    }
}
