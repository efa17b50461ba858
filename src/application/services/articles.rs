//! Saving generated articles as markdown files.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::debug;

use crate::application::generator::Article;
use crate::application::{ApplicationResult, IoResultExt};
use crate::infrastructure::traits::FileSystem;

/// Writes articles into a directory as `<timestamp>-<slug>.md`.
pub struct ArticleStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl ArticleStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// File name for an article written at `at`.
    pub fn file_name(article: &Article, at: DateTime<Local>) -> String {
        format!("{}-{}.md", at.format("%Y%m%d-%H%M%S"), slugify(&article.title))
    }

    /// Save the article and return where it went.
    pub fn save(&self, article: &Article, at: DateTime<Local>) -> ApplicationResult<PathBuf> {
        self.fs
            .create_dir_all(&self.dir)
            .with_path_context("create article directory", &self.dir)?;
        let path = self.dir.join(Self::file_name(article, at));
        self.fs
            .write(&path, &article.markdown)
            .with_path_context("write article", &path)?;
        debug!("save: {}", path.display());
        Ok(path)
    }
}

fn non_alnum() -> &'static Regex {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}

/// Lowercase, dash-separated ASCII slug; `article` if nothing is left.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = non_alnum().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::domain::{PathEntry, TopicId};
    use crate::infrastructure::traits::RealFileSystem;

    #[rstest]
    #[case("Sci-Fi Movies", "sci-fi-movies")]
    #[case("  C++ & Rust!  ", "c-rust")]
    #[case("Übermensch", "bermensch")]
    #[case("???", "article")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[test]
    fn given_article_when_saved_then_written_under_timestamped_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("articles");
        let store = ArticleStore::new(Arc::new(RealFileSystem), &dir);
        let article = Article {
            title: "Dune".into(),
            path: vec![PathEntry {
                prompt: "Dune".into(),
                id: TopicId::root(0),
            }],
            markdown: "# Dune\n".into(),
        };
        let at = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();

        let path = store.save(&article, at).unwrap();

        assert_eq!(path, dir.join("20240301-123005-dune.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Dune\n");
    }
}
