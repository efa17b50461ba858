//! Test support: logging setup, fixture forests and scripted generators.

use std::collections::VecDeque;
use std::env;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{ApplicationError, ApplicationResult, ArticleGenerator, ChildGenerator};
use crate::domain::{NewTopic, PathEntry, SeedTopic, TopicId};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "topicswipe=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Keep HTTP plumbing out of test output
    let noisy_modules = ["hyper", "reqwest", "h2"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Two roots, the first one three levels deep:
///
/// ```text
/// 0 Movies
/// ├── 0-0 Sci-Fi
/// │   ├── 0-0-0 Space Opera
/// │   └── 0-0-1 Cyberpunk
/// └── 0-1 Drama
/// 1 Music
/// ```
pub fn movies_seed() -> Vec<SeedTopic> {
    vec![
        SeedTopic::with_children(
            "Movies",
            vec![
                SeedTopic::with_children(
                    "Sci-Fi",
                    vec![SeedTopic::new("Space Opera"), SeedTopic::new("Cyberpunk")],
                ),
                SeedTopic::new("Drama"),
            ],
        ),
        SeedTopic::new("Music"),
    ]
}

/// Generator answering from a script and recording what it was asked.
///
/// Child requests pop scripted replies in order; an exhausted script yields
/// no topics. Articles echo the path.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ApplicationResult<Vec<NewTopic>>>>,
    calls: Mutex<Vec<(TopicId, Vec<PathEntry>)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with the given prompts.
    pub fn reply(self, prompts: &[&str]) -> Self {
        self.push(Ok(prompts.iter().map(|p| NewTopic::new(*p)).collect()))
    }

    /// Queue a failing reply.
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(ApplicationError::InvalidResponse(message.to_string())))
    }

    fn push(self, reply: ApplicationResult<Vec<NewTopic>>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Parents and paths of all child requests so far.
    pub fn calls(&self) -> Vec<(TopicId, Vec<PathEntry>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChildGenerator for ScriptedGenerator {
    async fn generate_children(
        &self,
        _prompt: &str,
        parent: &TopicId,
        path: &[PathEntry],
    ) -> ApplicationResult<Vec<NewTopic>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((parent.clone(), path.to_vec()));
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl ArticleGenerator for ScriptedGenerator {
    async fn generate_article(&self, path: &[PathEntry]) -> ApplicationResult<String> {
        let title = path.last().ok_or(ApplicationError::EmptyPath)?;
        let trail: Vec<&str> = path.iter().map(|e| e.prompt.as_str()).collect();
        Ok(format!("# {}\n\n{}\n", title.prompt, trail.join(" > ")))
    }
}
