//! Navigation and mutation behaviour of the topic tree controller.

use rstest::{fixture, rstest};

use topicswipe::domain::{
    NewTopic, ParentRef, SeedTopic, TopicId, TopicTreeController, TreeNodeConvert,
};
use topicswipe::util::testing::{init_test_setup, movies_seed};

fn id(raw: &str) -> TopicId {
    raw.parse().unwrap()
}

#[fixture]
fn tree() -> TopicTreeController {
    init_test_setup();
    TopicTreeController::new(Some(movies_seed()))
}

#[rstest]
fn given_seed_when_initialized_then_ids_decode_to_ancestor_paths(tree: TopicTreeController) {
    let ids: Vec<String> = tree
        .forest()
        .iter()
        .map(|(_, topic)| topic.id.to_string())
        .collect();
    assert_eq!(ids, vec!["0", "0-0", "0-0-0", "0-0-1", "0-1", "1"]);

    for (idx, topic) in tree.forest().iter() {
        assert_eq!(tree.forest().resolve(&topic.id), Some(idx));
        let expected_parent = topic.parent.map(|p| tree.forest().node(p).id.clone());
        assert_eq!(topic.id.parent(), expected_parent);
    }
}

#[rstest]
#[case::roots("0", 2)]
#[case::children_of_root("0-0", 2)]
#[case::leaves("0-0-1", 2)]
fn given_siblings_when_advancing_n_times_then_back_at_start(
    mut tree: TopicTreeController,
    #[case] start: &str,
    #[case] sibling_count: usize,
) {
    assert!(tree.switch_to(&id(start)));
    let mut visited = Vec::new();
    for _ in 0..sibling_count {
        assert_eq!(tree.advance_sibling(), Ok(true));
        visited.push(tree.current_id().to_string());
    }
    assert_eq!(tree.current_id(), &id(start));
    assert_eq!(visited.len(), sibling_count);
}

#[rstest]
fn given_inner_node_when_descend_then_ascend_then_symmetric(mut tree: TopicTreeController) {
    assert!(tree.descend());
    let before = tree.current_id().clone();
    let history_len = tree.history().len();

    assert!(tree.descend());
    assert!(tree.ascend());

    assert_eq!(tree.current_id(), &before);
    assert_eq!(tree.history().len(), history_len);
}

#[rstest]
fn given_append_when_looking_up_new_ids_then_resolves_to_fresh_leaves(
    mut tree: TopicTreeController,
) {
    let ids = tree
        .append_children(
            &ParentRef::Topic(id("0-1")),
            vec![NewTopic::new("Noir"), NewTopic::new(" Romance ")],
        )
        .unwrap();

    assert_eq!(ids, vec![id("0-1-0"), id("0-1-1")]);
    let prompts: Vec<&str> = ids
        .iter()
        .map(|new_id| {
            let topic = tree.lookup_by_id(new_id).unwrap();
            assert!(topic.children.is_empty());
            topic.prompt.as_str()
        })
        .collect();
    assert_eq!(prompts, vec!["Noir", "Romance"]);
    assert_eq!(tree.current_id(), &id("0-1-0"));
    assert_eq!(tree.history().last(), Some(&ParentRef::Topic(id("0-1"))));
}

#[rstest]
#[case("0", vec![])]
#[case("0-1", vec!["0"])]
#[case("0-0-1", vec!["0", "0-0"])]
fn given_node_at_depth_d_when_path_to_root_then_d_entries(
    tree: TopicTreeController,
    #[case] target: &str,
    #[case] expected: Vec<&str>,
) {
    let path = tree.path_to_root(&id(target));
    let ids: Vec<String> = path.iter().map(|e| e.id.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(path.len(), id(target).depth());
}

#[rstest]
fn given_node_under_second_root_when_path_to_root_then_empty(mut tree: TopicTreeController) {
    tree.append_children(&ParentRef::Topic(id("1")), vec![NewTopic::new("Jazz")])
        .unwrap();

    assert!(tree.path_to_root(&id("1-0")).is_empty());
    assert_eq!(tree.full_path(&id("1-0")).len(), 1);
}

#[rstest]
fn given_full_path_then_ends_with_target(tree: TopicTreeController) {
    let prompts: Vec<String> = tree
        .full_path(&id("0-0-0"))
        .into_iter()
        .map(|e| e.prompt)
        .collect();
    assert_eq!(prompts, vec!["Movies", "Sci-Fi", "Space Opera"]);
}

#[rstest]
fn given_unknown_id_when_switching_then_cursor_unchanged(mut tree: TopicTreeController) {
    assert!(!tree.switch_to(&id("7-7")));
    assert_eq!(tree.current_id(), &id("0"));
    assert!(tree.lookup_by_id(&id("7-7")).is_none());
}

#[rstest]
fn given_switch_when_ascending_then_uses_history_not_parent(mut tree: TopicTreeController) {
    tree.descend();
    tree.switch_to(&id("0-0-1"));

    assert!(tree.ascend());

    assert_eq!(tree.current_id(), &id("0"));
}

#[rstest]
fn given_flags_follow_cursor(mut tree: TopicTreeController) {
    assert!(tree.is_at_top() && tree.can_descend());
    assert!(!tree.is_at_bottom() && !tree.can_ascend());

    tree.switch_to(&id("0-0-0"));

    assert!(tree.is_at_bottom() && tree.can_ascend());
    assert!(!tree.is_at_top() && !tree.can_descend());
}

#[test]
fn given_movies_seed_when_descending_then_history_repeats_root() {
    let mut tree = TopicTreeController::new(Some(vec![SeedTopic::with_children(
        "Movies",
        vec![SeedTopic::new("Sci-Fi")],
    )]));
    assert_eq!(tree.current_id(), &id("0"));

    assert!(tree.descend());

    assert_eq!(tree.current_id(), &id("0-0"));
    assert_eq!(
        tree.history(),
        &[ParentRef::Topic(id("0")), ParentRef::Topic(id("0"))]
    );

    let ids = tree
        .append_children(&ParentRef::Topic(id("0")), vec![NewTopic::new("Comedy")])
        .unwrap();

    assert_eq!(ids, vec![id("0-1")]);
    assert_eq!(tree.current_id(), &id("0-1"));
    assert_eq!(tree.history().len(), 3);
    assert_eq!(tree.history().last(), Some(&ParentRef::Topic(id("0"))));
}

#[test]
fn given_single_root_forest_when_advancing_then_noop() {
    let mut tree = TopicTreeController::new(Some(vec![SeedTopic::new("Alone")]));
    assert_eq!(tree.advance_sibling(), Ok(false));
    assert_eq!(tree.current_id(), &id("0"));
}

#[rstest]
#[case::not_json("not json")]
#[case::object(r#"{"prompt": "Movies"}"#)]
#[case::empty_list("[]")]
#[case::blank_prompt(r#"[{"prompt": "  ", "children": []}]"#)]
fn given_malformed_seed_when_initialized_then_default_root(#[case] json: &str) {
    let tree = TopicTreeController::from_json(json, "Start here");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.current().prompt, "Start here");
    assert_eq!(tree.current_id(), &id("0"));
}

#[rstest]
fn given_cursor_when_rendering_tree_then_marked(mut tree: TopicTreeController) {
    tree.switch_to(&id("0-0-1"));
    let rendered = tree.to_tree_string().to_string();
    assert!(rendered.contains("Cyberpunk [0-0-1] <=="));
    assert!(rendered.contains("Music [1]"));
}

#[rstest]
fn given_root_sentinel_on_history_when_ascending_then_noop(mut tree: TopicTreeController) {
    tree.append_children(&ParentRef::Root, vec![NewTopic::new("Books")])
        .unwrap();
    assert!(tree.switch_to(&id("0-0")));
    assert_eq!(tree.history().last(), Some(&ParentRef::Root));
    let history_len = tree.history().len();

    assert!(!tree.ascend());

    assert_eq!(tree.current_id(), &id("0-0"));
    assert_eq!(tree.history().len(), history_len);
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn given_blank_default_topic_when_initialized_then_builtin_default(#[case] default_topic: &str) {
    let tree = TopicTreeController::with_default(None, default_topic);
    assert_eq!(tree.current().prompt, topicswipe::domain::DEFAULT_TOPIC);
}
