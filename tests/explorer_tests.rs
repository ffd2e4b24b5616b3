use proptest::prelude::*;
use std::collections::HashSet;
use widgetlab::demo::demo_forest;
use widgetlab::tree::{Forest, Node, NodeKind};

fn collect_ids(nodes: &[Node], ids: &mut Vec<String>) {
    for node in nodes {
        ids.push(node.id.clone());
        collect_ids(&node.children, ids);
    }
}

fn all_ids(forest: &Forest) -> Vec<String> {
    let mut ids = Vec::new();
    collect_ids(&forest.roots, &mut ids);
    ids
}

fn files_have_no_children(nodes: &[Node]) -> bool {
    nodes
        .iter()
        .all(|node| (node.is_folder() || node.children.is_empty()) && files_have_no_children(&node.children))
}

#[derive(Debug, Clone)]
enum Op {
    Create(NodeKind, Option<usize>, String),
    Rename(usize, String),
    Delete(usize),
    Toggle(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let kind = prop_oneof![Just(NodeKind::File), Just(NodeKind::Folder)];
    prop_oneof![
        (kind, proptest::option::of(0usize..40), "[ a-z.]{0,8}").prop_map(|(k, t, n)| Op::Create(k, t, n)),
        (0usize..40, "[ a-z.]{0,8}").prop_map(|(i, n)| Op::Rename(i, n)),
        (0usize..40).prop_map(Op::Delete),
        (0usize..40).prop_map(Op::Toggle),
    ]
}

fn pick(forest: &Forest, index: usize) -> String {
    let ids = all_ids(forest);
    if ids.is_empty() {
        "missing".to_string()
    } else {
        ids[index % ids.len()].clone()
    }
}

proptest! {
    #[test]
    fn test_operations_keep_ids_unique(ops in proptest::collection::vec(op_strategy(), 1..30)) {
        let mut forest = demo_forest();
        let mut next_id = 100u64;

        for op in ops {
            let before = forest.clone();
            forest = match op {
                Op::Create(kind, target, name) => {
                    let target = target.map(|i| pick(&forest, i));
                    next_id += 1;
                    let created = forest.create(kind, target.as_deref(), &next_id.to_string(), &name);
                    if name.trim().is_empty() {
                        prop_assert_eq!(&created, &before);
                    }
                    created
                }
                Op::Rename(i, name) => {
                    let id = pick(&forest, i);
                    let renamed = forest.rename(&id, &name);
                    if let Some(node) = renamed.find_by_id(&id) {
                        prop_assert!(!node.name.trim().is_empty());
                    }
                    renamed
                }
                Op::Delete(i) => {
                    let id = pick(&forest, i);
                    let deleted = forest.delete(&id);
                    prop_assert!(!deleted.contains(&id));
                    deleted
                }
                Op::Toggle(i) => {
                    let id = pick(&forest, i);
                    let toggled = forest.toggle(&id);
                    prop_assert_eq!(all_ids(&toggled), all_ids(&before));
                    toggled
                }
            };

            let ids = all_ids(&forest);
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert!(files_have_no_children(&forest.roots));
        }
    }

    #[test]
    fn test_delete_removes_whole_subtree(index in 0usize..15) {
        let forest = demo_forest();
        let id = pick(&forest, index);
        let mut subtree = Vec::new();
        if let Some(node) = forest.find_by_id(&id) {
            collect_ids(std::slice::from_ref(node), &mut subtree);
        }

        let after = forest.delete(&id);
        for removed in &subtree {
            prop_assert!(!after.contains(removed));
        }
        prop_assert_eq!(all_ids(&after).len(), all_ids(&forest).len() - subtree.len());
    }

    #[test]
    fn test_toggle_twice_is_identity(index in 0usize..15) {
        let forest = demo_forest();
        let id = pick(&forest, index);
        prop_assert_eq!(forest.toggle(&id).toggle(&id), forest);
    }
}

#[test]
fn test_create_into_file_is_noop() {
    let forest = demo_forest();
    let after = forest.create(NodeKind::File, Some("12"), "99", "x.ts");
    assert_eq!(after, forest);
}

#[test]
fn test_create_at_root_appends() {
    let forest = demo_forest();
    let after = forest.create(NodeKind::Folder, None, "99", "  docs  ");
    let last = after.roots.last().expect("root");
    assert_eq!(last.id, "99");
    assert_eq!(last.name, "docs");
    assert!(last.is_folder());
}

#[test]
fn test_visible_nodes_follow_expansion() {
    let forest = demo_forest();
    let visible: Vec<_> = forest
        .visible_nodes_with_depth()
        .into_iter()
        .map(|(node, depth)| (node.id.clone(), depth))
        .collect();
    assert_eq!(visible[0], ("1".to_string(), 0));
    assert_eq!(visible[1], ("2".to_string(), 1));
    // components is collapsed, so utils follows directly
    assert_eq!(visible[2], ("6".to_string(), 1));
    assert!(!visible.iter().any(|(id, _)| id == "11"));
}
