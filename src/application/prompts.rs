//! Prompt construction and response parsing for the completion-backed
//! generators.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NewTopic, PathEntry};

pub const TOPICS_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates related subtopics. Return only valid JSON objects.";

pub const ARTICLE_SYSTEM_PROMPT: &str = "You are a knowledgeable writer that creates detailed articles in markdown format.
Write in clear, complete sentences. Each sentence should be grammatically correct and properly punctuated.
Avoid run-on sentences and maintain proper paragraph structure.";

/// Render a path as `A > B > C`.
pub fn topic_path(path: &[PathEntry]) -> String {
    path.iter().map(|entry| entry.prompt.as_str()).join(" > ")
}

/// User prompt asking for `min..=max` subtopics of `prompt`.
pub fn build_topics_prompt(prompt: &str, path: &[PathEntry], min: usize, max: usize) -> String {
    let path_text = topic_path(path);
    format!(
        r#"Generate {min}-{max} subtopics for "{prompt}".
The topic path is how the user got to this topic so it is important to generate subtopics that are related to the path: {path_text}

Each subtopic should:
- Be related to the main topic
- Not repeat existing topics in the path
- Be specific and interesting
- Be 1-4 words long

Respond with a JSON object only, using this structure:
{{
  "children": [
    {{
      "prompt": "First subtopic",
      "children": []
    }},
    {{
      "prompt": "Second subtopic",
      "children": []
    }}
  ]
}}

Important: Return ONLY the JSON object, no additional text or explanation."#
    )
}

/// User prompt asking for an article about the last topic of `path`.
pub fn build_article_prompt(path: &[PathEntry]) -> ApplicationResult<String> {
    let last = path.last().ok_or(ApplicationError::EmptyPath)?;
    let path_text = topic_path(path);
    Ok(format!(
        r#"Create a detailed article about {topic}.
the topic path is how they got to the topic and should be taken into account. topic path: {path_text}

The article should:
- articles should be 300-500 words
- Be written in clean markdown format
- Do not use html tags
- Be well-structured and engaging
- Include a brief introduction and conclusion

Format example:
# Main Heading

Introduction paragraph here.

## Subheading

Content paragraph here.

Another paragraph here."#,
        topic = last.prompt
    ))
}

fn fenced_block() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fenced block pattern is valid")
    })
}

/// Extract a JSON object from completion text (handles code fences and
/// surrounding prose).
pub fn extract_json(text: &str) -> String {
    if let Some(inner) = fenced_block().captures(text).and_then(|c| c.get(1)) {
        return inner.as_str().trim().to_string();
    }

    // Find first { and last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.trim().to_string()
}

#[derive(Deserialize)]
struct ChildrenResponse {
    children: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawChild {
    #[serde(default)]
    prompt: Option<String>,
}

/// Parse the `{"children": [...]}` reply of the topics prompt.
///
/// Children without a usable prompt are dropped; the result is capped at
/// `max` entries. A reply without a `children` array is an error.
pub fn parse_children(text: &str, max: usize) -> ApplicationResult<Vec<NewTopic>> {
    let json = extract_json(text);
    let response: ChildrenResponse = serde_json::from_str(&json)
        .map_err(|e| ApplicationError::InvalidResponse(format!("not a JSON object: {e}")))?;

    let Some(serde_json::Value::Array(items)) = response.children else {
        return Err(ApplicationError::InvalidResponse(
            "response does not contain children array".to_string(),
        ));
    };

    let topics: Vec<NewTopic> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawChild>(item).ok())
        .filter_map(|child| child.prompt)
        .map(|prompt| prompt.trim().to_string())
        .filter(|prompt| !prompt.is_empty())
        .take(max)
        .map(NewTopic::new)
        .collect();

    debug!("parse_children: {} usable children", topics.len());
    Ok(topics)
}
