//! Interactive exploration loop.
//!
//! Reads one command per line from stdin while generation tasks run in the
//! background; their results come back over a channel and are applied to the
//! session in arrival order.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::application::services::ArticleStore;
use crate::application::{
    ApplicationError, ApplicationResult, Article, ChildRequest, ExplorerSession, Gesture,
    SwipeAction,
};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::domain::{NewTopic, PathEntry, TopicId, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::traits::{SelectionItem, Selector};

pub const HELP: &str = "\
l, left         next sibling (wraps around)
r, right        first subtopic; generates subtopics at a leaf
u, up           back to the remembered topic
d, down         generate an article about the current topic
add <prompt>    add a topic next to the current one and generate its subtopics
goto <id>       jump to a topic by id, e.g. 0-2-1
jump            pick a topic interactively
tree            show the whole tree
dump            show the whole tree as JSON
path            show the path to the current topic
status          show cursor flags
log             show the debug log
help            show this help
quit            leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Swipe(Gesture),
    Add(String),
    Goto(TopicId),
    Jump,
    Tree,
    Dump,
    Path,
    Status,
    Log,
    Help,
    Quit,
    Empty,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Ok(ReplCommand::Empty),
            "add" if rest.is_empty() => Err("usage: add <prompt>".to_string()),
            "add" => Ok(ReplCommand::Add(rest.to_string())),
            "goto" if rest.is_empty() => Err("usage: goto <id>".to_string()),
            "goto" => rest
                .parse()
                .map(ReplCommand::Goto)
                .map_err(|e| e.to_string()),
            "jump" => Ok(ReplCommand::Jump),
            "tree" => Ok(ReplCommand::Tree),
            "dump" => Ok(ReplCommand::Dump),
            "path" => Ok(ReplCommand::Path),
            "status" => Ok(ReplCommand::Status),
            "log" => Ok(ReplCommand::Log),
            "help" | "h" | "?" => Ok(ReplCommand::Help),
            "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
            other => other
                .parse::<Gesture>()
                .map(ReplCommand::Swipe)
                .map_err(|_| format!("unknown command: {other} (try 'help')")),
        }
    }
}

/// Finished background work.
enum Generated {
    Children(ChildRequest, ApplicationResult<Vec<NewTopic>>),
    Article(ApplicationResult<Article>),
}

enum Flow {
    Continue,
    Quit,
}

struct Repl {
    session: ExplorerSession,
    selector: Arc<dyn Selector>,
    store: Option<ArticleStore>,
    show_log: bool,
    tx: mpsc::UnboundedSender<Generated>,
}

/// Run the interactive loop until `quit` or end of input.
#[instrument(level = "debug", skip(container))]
pub async fn run(container: &ServiceContainer) -> CliResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut repl = Repl {
        session: container.explorer_session()?,
        selector: Arc::clone(&container.selector),
        store: container.article_store(),
        show_log: container.settings.debug_log,
        tx,
    };
    output::info(&"Type 'help' for commands.");
    repl.render();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output::prompt(&">");
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| InfraError::io("read command", e))?;
                let Some(line) = line else {
                    debug!("run: end of input");
                    break;
                };
                match line.parse::<ReplCommand>() {
                    Ok(command) => {
                        if let Flow::Quit = repl.handle(command) {
                            break;
                        }
                    }
                    Err(message) => output::warning(&message),
                }
            }
            Some(generated) = rx.recv() => {
                println!();
                repl.apply(generated);
            }
        }
        if repl.show_log {
            repl.print_log();
        }
    }
    Ok(())
}

impl Repl {
    fn handle(&mut self, command: ReplCommand) -> Flow {
        match command {
            ReplCommand::Swipe(gesture) => self.swipe(gesture),
            ReplCommand::Add(prompt) => self.add(&prompt),
            ReplCommand::Goto(id) => {
                if self.session.switch_to(&id) {
                    self.render();
                } else {
                    output::warning(&format!("topic {id} not found"));
                }
            }
            ReplCommand::Jump => self.jump(),
            ReplCommand::Tree => output::info(&self.session.tree().to_tree_string()),
            ReplCommand::Dump => match serde_json::to_string_pretty(&self.session.tree().snapshot())
            {
                Ok(json) => output::info(&json),
                Err(e) => output::error(&e),
            },
            ReplCommand::Path => {
                let tree = self.session.tree();
                for entry in tree.full_path(tree.current_id()) {
                    output::detail(&format!("{:<10} {}", entry.id, entry.prompt));
                }
            }
            ReplCommand::Status => self.status(),
            ReplCommand::Log => self.print_log(),
            ReplCommand::Help => output::info(&HELP),
            ReplCommand::Quit => return Flow::Quit,
            ReplCommand::Empty => {}
        }
        Flow::Continue
    }

    fn swipe(&mut self, gesture: Gesture) {
        match self.session.swipe(gesture) {
            Ok(SwipeAction::Navigated { moved: true }) => self.render(),
            Ok(SwipeAction::Navigated { moved: false }) => {
                output::hint(&format!("nothing to the {gesture}"))
            }
            Ok(SwipeAction::GenerateChildren(request)) => self.spawn_children(request),
            Ok(SwipeAction::GenerateArticle(path)) => self.spawn_article(path),
            Err(ApplicationError::GenerationInProgress) => {
                output::warning(&"still generating subtopics, please wait")
            }
            Err(e) => output::error(&e),
        }
    }

    fn add(&mut self, prompt: &str) {
        match self.session.add_topic(prompt) {
            Ok(id) => {
                output::success(&format!("added {} ({})", prompt.trim(), id));
                self.render();
                match self.session.begin_children_request() {
                    Ok(request) => self.spawn_children(request),
                    Err(e) => output::warning(&e),
                }
            }
            Err(e) => output::error(&e),
        }
    }

    fn jump(&mut self) {
        let items: Vec<SelectionItem> = self
            .session
            .tree()
            .forest()
            .iter()
            .map(|(_, topic)| SelectionItem {
                display: format!("{:<10} {}", topic.id, topic.prompt),
                value: topic.id.to_string(),
            })
            .collect();
        let selector = Arc::clone(&self.selector);
        let picked = tokio::task::block_in_place(|| selector.select_one(&items, "topic> "));
        match picked {
            Ok(Some(item)) => match item.value.parse::<TopicId>() {
                Ok(id) => {
                    self.session.switch_to(&id);
                    self.render();
                }
                Err(e) => output::error(&e),
            },
            Ok(None) => {}
            Err(message) => output::error(&InfraError::Selector { message }),
        }
    }

    fn status(&self) {
        let tree = self.session.tree();
        let flags = tree.flags();
        output::detail(&format!("topic:      {} ({})", tree.current().prompt, tree.current_id()));
        output::detail(&format!("topics:     {} (depth {})", tree.len(), tree.forest().depth()));
        output::detail(&format!("at top:     {}", flags.is_at_top));
        output::detail(&format!("at bottom:  {}", flags.is_at_bottom));
        output::detail(&format!("history:    {}", tree.history().len()));
        output::detail(&format!("generating: {}", self.session.is_generating()));
    }

    fn print_log(&self) {
        output::header(&"Debug log");
        for entry in self.session.debug_log() {
            output::detail(&entry);
        }
    }

    fn spawn_children(&self, request: ChildRequest) {
        output::hint(&format!("generating subtopics for {}...", request.prompt));
        let generator = self.session.child_generator();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let (request, result) = ExplorerSession::run_children_request(generator, request).await;
            // Receiver gone means the loop has ended.
            let _ = tx.send(Generated::Children(request, result));
        });
    }

    fn spawn_article(&self, path: Vec<PathEntry>) {
        output::hint(&format!("writing article about {}...", output::breadcrumb(&path)));
        let generator = self.session.article_generator();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = ExplorerSession::run_article_request(generator, path).await;
            let _ = tx.send(Generated::Article(result));
        });
    }

    fn apply(&mut self, generated: Generated) {
        match generated {
            Generated::Children(request, result) => {
                match self.session.complete_children_request(request, result) {
                    Ok(ids) => {
                        output::success(&format!("{} new subtopics", ids.len()));
                        self.render();
                    }
                    Err(e) => output::error(&e),
                }
            }
            Generated::Article(Ok(article)) => {
                self.session
                    .note(format!("Generated article: {}", article.title));
                output::header(&output::breadcrumb(&article.path));
                output::info(&article.markdown);
                if let Some(store) = &self.store {
                    match store.save(&article, Local::now()) {
                        Ok(path) => output::action("Saved", &path.display()),
                        Err(e) => output::error(&e),
                    }
                }
            }
            Generated::Article(Err(e)) => {
                self.session.note(format!("Error generating article: {e}"));
                output::error(&e);
            }
        }
    }

    fn render(&self) {
        let tree = self.session.tree();
        output::card(
            tree.current(),
            &tree.full_path(tree.current_id()),
            &tree.flags(),
            self.session.is_generating(),
        );
    }
}
