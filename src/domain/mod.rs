//! Domain layer: the topic forest and its navigation protocol
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod controller;
pub mod entities;
pub mod error;
pub mod topic_id;
pub mod tree_traits;

/// Prompt of the single root used when no usable seed is available.
pub const DEFAULT_TOPIC: &str = "Explore";

pub use arena::{Topic, TopicArena};
pub use builder::ForestBuilder;
pub use controller::TopicTreeController;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use topic_id::{ParentRef, TopicId, ROOT_SENTINEL};
pub use tree_traits::TreeNodeConvert;
