//! Application layer: exploration session and generation use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod generator;
pub mod prompts;
pub mod services;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use generator::{Article, ArticleGenerator, ChildGenerator, ChildRequest};
pub use session::{ExplorerSession, Gesture, SwipeAction, DEBUG_LOG_CAPACITY};
