//! Application services
//!
//! Each service focuses on a specific domain concern.

pub mod articles;
pub mod generators;
pub mod seed;

pub use articles::{slugify, ArticleStore};
pub use generators::{LlmArticleGenerator, LlmChildGenerator};
pub use seed::SeedService;
