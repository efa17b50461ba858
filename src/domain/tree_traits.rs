use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::TopicArena;
use crate::domain::controller::TopicTreeController;

/// Marker appended to the label of the topic under the cursor.
pub const CURSOR_MARKER: &str = " <==";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn build_tree(arena: &TopicArena, node_idx: Index, cursor: Option<Index>) -> Tree<String> {
    let node = arena.node(node_idx);
    let mut label = format!("{} [{}]", node.prompt, node.id);
    if cursor == Some(node_idx) {
        label.push_str(CURSOR_MARKER);
    }
    let leaves: Vec<_> = node
        .children
        .iter()
        .map(|&child| build_tree(arena, child, cursor))
        .collect();
    Tree::new(label).with_leaves(leaves)
}

fn forest_tree(arena: &TopicArena, cursor: Option<Index>) -> Tree<String> {
    match arena.roots() {
        [] => Tree::new("Empty forest".to_string()),
        [single] => build_tree(arena, *single, cursor),
        roots => Tree::new("Topics".to_string()).with_leaves(
            roots
                .iter()
                .map(|&root| build_tree(arena, root, cursor))
                .collect::<Vec<_>>(),
        ),
    }
}

impl TreeNodeConvert for TopicArena {
    fn to_tree_string(&self) -> Tree<String> {
        forest_tree(self, None)
    }
}

impl TreeNodeConvert for TopicTreeController {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let cursor = self.forest().resolve(self.current_id());
        forest_tree(self.forest(), cursor)
    }
}
