//! topicswipe: explore a topic tree by swiping through siblings and
//! subtopics, with subtopics and articles produced by a completion service.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
