/// Cross-module tests: differ and observer output through the full pipeline
use crate::applier::apply_patches;
use crate::config::RendererConfig;
use crate::differ::{diff, Differ};
use crate::live::{LiveTree, NodeId};
use crate::optimizer::optimize_patches;
use crate::patch::{AttrUpdate, Patch, PatchKind};
use crate::renderer::Renderer;
use crate::vnode::{VChild, VNode};
use std::time::Duration;

fn mounted(vnode: &VNode) -> (LiveTree, NodeId) {
    let mut tree = LiveTree::new();
    let root = tree.create_root("body");
    let node = tree.materialize_node(vnode);
    tree.append_child(root, node).unwrap();
    (tree, node)
}

fn list(items: &[&str]) -> VNode {
    VNode::new("ul").with_children(
        items
            .iter()
            .map(|item| VChild::from(VNode::new("li").with_text(*item))),
    )
}

fn worker_config() -> RendererConfig {
    RendererConfig {
        use_worker: true,
        worker_threshold: 1,
        ..RendererConfig::default()
    }
}

#[test]
fn test_scenario_remove_before_untargeted_insert() {
    let (mut tree, ul) = mounted(&list(&["x"]));
    let x = tree.child_at(ul, 0).unwrap();

    let batch = vec![
        Patch::remove(x),
        Patch::insert(ul, VNode::new("li").with_text("y")),
    ];
    let optimized = optimize_patches(batch);

    assert_eq!(optimized[0].kind, PatchKind::Remove);
    assert_eq!(optimized[1].kind, PatchKind::Insert);

    apply_patches(&mut tree, &optimized);
    assert_eq!(tree.to_vchild(ul), Some(list(&["y"]).into()));
}

#[test]
fn test_remove_applies_first_regardless_of_enqueue_order() {
    let mut renderer = Renderer::new(RendererConfig::default()).unwrap();
    let body = renderer.tree_mut().create_root("body");
    let mount = renderer.mount(body, list(&["x", "y"])).unwrap();
    let ul = renderer.mount_root(mount).unwrap();
    let x = renderer.tree().child_at(ul, 0).unwrap();

    // Inserting before index 1 first would land between `x` and `y`
    renderer.queue_patch(Patch::insert_at(ul, 1, VChild::from(VNode::new("li").with_text("c"))));
    renderer.queue_patch(Patch::remove(x));
    renderer.flush();

    assert_eq!(renderer.tree().to_vchild(ul), Some(list(&["y", "c"]).into()));
}

#[test]
fn test_scenario_class_and_text_change() {
    let old = VNode::new("div").with_prop("class", "a").with_text("hi");
    let new = VNode::new("div").with_prop("class", "b").with_text("bye");
    let (tree, div) = mounted(&old);

    let patches = diff(&tree, div, &old, &new);

    assert_eq!(patches.len(), 2);
    let attributes = patches
        .iter()
        .find(|p| p.kind == PatchKind::Attributes)
        .unwrap();
    assert_eq!(attributes.target, Some(div));
    let map = attributes.attributes.as_ref().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["class"], AttrUpdate::set("class", "b"));

    let text = patches.iter().find(|p| p.kind == PatchKind::Text).unwrap();
    assert_eq!(text.new_value.as_deref(), Some("bye"));
    assert_eq!(text.target, tree.child_at(div, 0));
}

#[test]
fn test_scenario_single_text_change_in_children() {
    let old = VNode::new("p").with_children(["a", "b", "c"]);
    let (tree, p) = mounted(&old);

    let patches = Differ::new(&tree).diff_children(
        p,
        &[VChild::text("a"), VChild::text("b"), VChild::text("c")],
        &[VChild::text("a"), VChild::text("x"), VChild::text("c")],
    );

    assert_eq!(patches, vec![Patch::text(tree.child_at(p, 1).unwrap(), "x")]);
}

#[test]
fn test_worker_path_matches_inline_path() {
    let old = list(&["one", "two", "three"]);
    let new = list(&["three", "one"]);

    let mut results = Vec::new();
    for config in [RendererConfig::default(), worker_config()] {
        let mut renderer = Renderer::new(config).unwrap();
        let body = renderer.tree_mut().create_root("body");
        let mount = renderer.mount(body, old.clone()).unwrap();
        let ul = renderer.mount_root(mount).unwrap();

        let patches = diff(renderer.tree(), ul, &old, &new);
        renderer.queue_patches(patches);
        renderer.flush();

        let stats = renderer.stats();
        results.push((renderer.tree().to_vchild(ul), stats.total_patches, stats.failed_patches));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].0, Some(new.into()));
}

#[test]
fn test_worker_batch_keeps_renderer_busy_until_applied() {
    let mut renderer = Renderer::new(worker_config()).unwrap();
    assert!(renderer.has_worker());
    let body = renderer.tree_mut().create_root("body");

    renderer.queue_patch(Patch::set_attribute(body, "title", Some("a".into())));
    assert!(renderer.on_frame());
    assert!(renderer.is_rendering());
    assert!(renderer.stats().is_rendering);
    assert!(renderer.wants_frame());

    // Arrives while the batch is with the worker; no second drain yet
    renderer.queue_patch(Patch::set_attribute(body, "title", Some("b".into())));
    assert!(!renderer.is_scheduled());
    assert!(!renderer.process_batch());

    let mut attempts = 0;
    while !renderer.poll_worker() {
        attempts += 1;
        assert!(attempts < 500, "worker never answered");
        std::thread::sleep(Duration::from_millis(10));
    }

    assert!(!renderer.is_rendering());
    assert_eq!(renderer.tree().element(body).unwrap().attributes["title"], "a");
    assert!(renderer.is_scheduled());

    renderer.flush();
    assert_eq!(renderer.tree().element(body).unwrap().attributes["title"], "b");
    assert_eq!(renderer.stats().batch_count, 2);
}

#[test]
fn test_destroy_discards_in_flight_worker_batch() {
    let mut renderer = Renderer::new(worker_config()).unwrap();
    let body = renderer.tree_mut().create_root("body");

    renderer.queue_patch(Patch::set_attribute(body, "title", Some("late".into())));
    assert!(renderer.on_frame());
    renderer.destroy();

    assert!(!renderer.is_rendering());
    assert!(!renderer.poll_worker());
    renderer.flush();
    assert!(renderer.tree().element(body).unwrap().attributes.is_empty());
    assert_eq!(renderer.stats().batch_count, 0);
}

#[test]
fn test_observer_replays_are_idempotent() {
    let mut renderer = Renderer::new(RendererConfig::default()).unwrap();
    let body = renderer.tree_mut().create_root("body");
    let mount = renderer.mount(body, list(&["a"])).unwrap();
    let ul = renderer.mount_root(mount).unwrap();
    assert!(renderer.observe_element(ul));

    // An external writer edits the observed subtree
    let tree = renderer.tree_mut();
    let li = tree.child_at(ul, 0).unwrap();
    tree.set_attribute(li, "class", "done").unwrap();
    tree.set_attribute(ul, "style", "color: red").unwrap();
    let extra = tree.materialize(&VChild::from(VNode::new("li").with_text("b")));
    tree.append_child(ul, extra).unwrap();
    let text = tree.child_at(li, 0).unwrap();
    tree.set_text(text, "A").unwrap();
    let snapshot = tree.to_vchild(ul);

    assert_eq!(renderer.sync_observed(), 4);
    renderer.flush();

    let stats = renderer.stats();
    assert_eq!(stats.total_patches, 4);
    assert_eq!(stats.failed_patches, 0);
    assert_eq!(renderer.tree().to_vchild(ul), snapshot);
    assert!(!renderer.tree().has_records());
}

#[test]
fn test_observed_records_drain_with_next_batch() {
    let mut renderer = Renderer::new(RendererConfig::default()).unwrap();
    let body = renderer.tree_mut().create_root("body");
    assert!(renderer.observe_element(body));

    renderer.tree_mut().set_attribute(body, "id", "app").unwrap();
    renderer.queue_patch(Patch::set_attribute(body, "title", Some("t".into())));
    assert!(renderer.on_frame());

    assert_eq!(renderer.stats().total_patches, 2);
    assert!(!renderer.tree().has_records());
}
