//! Integration tests for the renderer against the in-memory host
//!
//! These tests verify that:
//! - Re-rendering an identical tree is free
//! - Keyed children are reused, moved, mounted, and unmounted minimally
//! - Text and list children swap cleanly
//! - Kind or key mismatches destroy and recreate
//! - Container bindings remember mounted, unmounted, and never-rendered states

use ripple_core::{
    h, Binding, Children, Props, RenderError, Renderer, RendererConfig, VNode, VNodeType,
};
use ripple_host::{HostNodeId, MemoryHost, Mutation, MutationStats};

type Node = VNode<HostNodeId>;

fn setup() -> (Renderer<MemoryHost>, HostNodeId) {
    let mut host = MemoryHost::new();
    let app = host.create_container("app");
    (Renderer::with_config(host, RendererConfig::strict()), app)
}

fn item(key: &str) -> Node {
    h("li", Props::new().key(key), key)
}

fn list(keys: &[&str]) -> Node {
    h("ul", Props::new(), keys.iter().map(|k| item(k)).collect::<Vec<_>>())
}

/// Text of each `<li>` under the container's `<ul>`, in host order
fn host_order(renderer: &Renderer<MemoryHost>, app: HostNodeId) -> Vec<String> {
    let host = renderer.host();
    let ul = host.children(app)[0];
    host.children(ul)
        .iter()
        .map(|&li| host.text_content(li))
        .collect()
}

/// Host handles of the mounted `<li>` nodes, in virtual order
fn item_handles(renderer: &Renderer<MemoryHost>, app: HostNodeId) -> Vec<(String, HostNodeId)> {
    let ul = renderer.current(&app).unwrap();
    ul.children()
        .as_nodes()
        .unwrap()
        .iter()
        .map(|li| (li.key().unwrap().to_string(), *li.el().unwrap()))
        .collect()
}

fn take_stats(renderer: &mut Renderer<MemoryHost>) -> MutationStats {
    MutationStats::from_mutations(&renderer.host_mut().take_mutations())
}

fn page() -> Node {
    h(
        "section",
        Props::new().attr("id", "main").attr("class", "page"),
        vec![
            h("h1", Props::new(), "Title"),
            list(&["a", "b", "c"]),
            VNode::text("footer"),
        ],
    )
}

/// Test the update scenario: one prop patch and one text write on the same node
#[test]
fn test_prop_and_text_update_reuse_host_node() {
    let (mut renderer, app) = setup();

    renderer.render(Some(h("div", Props::new().attr("id", "a"), "hello")), &app);
    let div = *renderer.current(&app).unwrap().el().unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(Some(h("div", Props::new().attr("id", "b"), "world")), &app);

    assert_eq!(
        renderer.host_mut().take_mutations(),
        vec![
            Mutation::PatchProp {
                node: div,
                key: "id".into(),
                prev: Some("a".into()),
                next: Some("b".into()),
            },
            Mutation::SetElementText {
                node: div,
                text: "world".into(),
            },
        ]
    );
    assert_eq!(renderer.current(&app).unwrap().el(), Some(&div));
    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><div id="b">world</div></div>"#
    );
}

/// Test that rendering the same tree twice issues no host mutations
#[test]
fn test_identical_rerender_is_idempotent() {
    let (mut renderer, app) = setup();

    renderer.render(Some(page()), &app);
    let first = renderer.host().to_markup(app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(page()), &app);

    assert!(renderer.host().mutations().is_empty());
    assert_eq!(renderer.host().to_markup(app), first);
}

/// Test that render(None) tears everything down and remembers it
#[test]
fn test_mount_unmount_symmetry() {
    let (mut renderer, app) = setup();
    assert!(renderer.binding(&app).is_none());

    renderer.render(Some(page()), &app);
    assert!(matches!(renderer.binding(&app), Some(Binding::Mounted(_))));

    renderer.render(None, &app);

    assert!(renderer.host().children(app).is_empty());
    assert!(renderer.current(&app).is_none());
    assert!(matches!(renderer.binding(&app), Some(Binding::Unmounted)));

    // unmounting again is a no-op
    renderer.host_mut().take_mutations();
    renderer.render(None, &app);
    assert!(renderer.host().mutations().is_empty());
}

/// Test that list children are fully unmounted before text is written, and back
#[test]
fn test_text_and_list_children_round_trip() {
    let (mut renderer, app) = setup();

    renderer.render(
        Some(h("div", Props::new().key("k"), vec![item("a"), item("b")])),
        &app,
    );
    let div = *renderer.current(&app).unwrap().el().unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(Some(h("div", Props::new().key("k"), "text")), &app);
    let mutations = renderer.host_mut().take_mutations();
    assert_eq!(mutations.len(), 3);
    assert!(matches!(mutations[0], Mutation::Remove { .. }));
    assert!(matches!(mutations[1], Mutation::Remove { .. }));
    assert_eq!(
        mutations[2],
        Mutation::SetElementText {
            node: div,
            text: "text".into()
        }
    );

    renderer.render(
        Some(h("div", Props::new().key("k"), vec![item("c")])),
        &app,
    );
    let mutations = renderer.host_mut().take_mutations();
    assert_eq!(
        mutations[0],
        Mutation::SetElementText {
            node: div,
            text: String::new()
        }
    );
    assert_eq!(MutationStats::from_mutations(&mutations).created, 1);
    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><div><li>c</li></div></div>"#
    );
}

/// Test that clearing text or list children to nothing empties the element
#[test]
fn test_children_cleared_to_none() {
    let (mut renderer, app) = setup();

    renderer.render(Some(h("p", Props::new(), "x")), &app);
    renderer.render(Some(h("p", Props::new(), ())), &app);
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p></p></div>"#);

    renderer.render(Some(h("p", Props::new(), vec![item("a")])), &app);
    renderer.host_mut().take_mutations();
    renderer.render(Some(h("p", Props::new(), ())), &app);
    assert_eq!(take_stats(&mut renderer).removed, 1);
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p></p></div>"#);
}

/// Test that appending to a keyed list mounts only the new node
#[test]
fn test_keyed_append_mounts_one() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["a", "b", "c", "d"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.moved, 0);
    assert_eq!(host_order(&renderer, app), vec!["a", "b", "c", "d"]);
}

/// Test that truncating a keyed list unmounts only the dropped node
#[test]
fn test_keyed_truncate_unmounts_one() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c", "d"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["a", "b", "c"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 1);
    assert_eq!(host_order(&renderer, app), vec!["a", "b", "c"]);
}

/// Test that a leading insert is anchored before the first reused node
#[test]
fn test_keyed_prepend_and_middle_insert() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["b", "d"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["a", "b", "c", "d"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.removed, 0);
    assert_eq!(host_order(&renderer, app), vec!["a", "b", "c", "d"]);
}

/// Test that a pure rotation needs exactly one move and no remounts
#[test]
fn test_keyed_rotation_moves_once() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c"])), &app);
    let before = item_handles(&renderer, app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["c", "a", "b"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.moved, 1);
    assert_eq!(host_order(&renderer, app), vec!["c", "a", "b"]);

    // every host node survived the reorder
    let mut after = item_handles(&renderer, app);
    after.sort();
    let mut before = before;
    before.sort();
    assert_eq!(before, after);
}

/// Test the general phase with moves, mounts, and removals at once
#[test]
fn test_keyed_general_reorder() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c", "d", "e", "f", "g"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["a", "b", "e", "c", "d", "h", "f", "g"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.moved, 1);
    assert_eq!(
        host_order(&renderer, app),
        vec!["a", "b", "e", "c", "d", "h", "f", "g"]
    );
}

/// Test that unmatched old nodes are removed during a reorder
#[test]
fn test_keyed_reorder_with_removals() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c", "d"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["d", "b"])), &app);

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 2);
    assert_eq!(stats.moved, 1);
    assert_eq!(host_order(&renderer, app), vec!["d", "b"]);
}

/// Test a table of permutations: final order and mount/unmount counts
#[test]
fn test_keyed_permutations() {
    let cases: &[(&[&str], &[&str])] = &[
        (&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"]),
        (&["a", "b", "c", "d", "e"], &["b", "c", "d", "e", "a"]),
        (&["a", "b", "c"], &["x", "y", "z"]),
        (&["a", "b", "c", "d"], &["d", "x", "b", "y", "a"]),
        (&[], &["a", "b"]),
        (&["a"], &[]),
        (&["a", "b", "c", "d", "e", "f"], &["a", "f", "c", "d", "e", "b"]),
    ];

    for (old, new) in cases {
        let (mut renderer, app) = setup();
        renderer.render(Some(list(old)), &app);
        renderer.host_mut().take_mutations();

        renderer.render(Some(list(new)), &app);

        let stats = take_stats(&mut renderer);
        let fresh = new.iter().filter(|k| !old.contains(k)).count();
        let gone = old.iter().filter(|k| !new.contains(k)).count();
        assert_eq!(stats.created, fresh, "{old:?} -> {new:?}");
        assert_eq!(stats.removed, gone, "{old:?} -> {new:?}");
        assert_eq!(host_order(&renderer, app), new.to_vec(), "{old:?} -> {new:?}");
    }
}

/// Test that a full reversal keeps one node in place and moves the rest
#[test]
fn test_keyed_reversal_move_count() {
    let (mut renderer, app) = setup();

    renderer.render(Some(list(&["a", "b", "c", "d", "e"])), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(list(&["e", "d", "c", "b", "a"])), &app);

    assert_eq!(take_stats(&mut renderer).moved, 4);
}

/// Test that unkeyed siblings are matched by kind in the general phase
#[test]
fn test_unkeyed_children_match_by_kind() {
    let (mut renderer, app) = setup();

    renderer.render(
        Some(h(
            "div",
            Props::new(),
            vec![h("li", Props::new(), "x"), h("span", Props::new(), "y")],
        )),
        &app,
    );
    renderer.host_mut().take_mutations();

    renderer.render(
        Some(h(
            "div",
            Props::new(),
            vec![h("span", Props::new(), "y"), h("li", Props::new(), "x")],
        )),
        &app,
    );

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.moved, 1);
    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><div><span>y</span><li>x</li></div></div>"#
    );
}

/// Test that a kind change under the same key destroys and recreates
#[test]
fn test_kind_mismatch_replaces_subtree() {
    let (mut renderer, app) = setup();

    renderer.render(Some(h("div", Props::new().key("x"), "body")), &app);
    let old_el = *renderer.current(&app).unwrap().el().unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(Some(h("span", Props::new().key("x"), "body")), &app);

    let mutations = renderer.host_mut().take_mutations();
    assert_eq!(mutations[0], Mutation::Remove { node: old_el });
    let stats = MutationStats::from_mutations(&mutations);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.prop_patches, 0);
    assert_ne!(renderer.current(&app).unwrap().el(), Some(&old_el));
    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><span>body</span></div>"#
    );
}

/// Test that a replaced sibling keeps its position
#[test]
fn test_mismatch_among_siblings_keeps_position() {
    let (mut renderer, app) = setup();

    let tree = |middle: Node| {
        h(
            "div",
            Props::new(),
            vec![h("p", Props::new(), "a"), middle, h("p", Props::new(), "b")],
        )
    };

    renderer.render(Some(tree(h("div", Props::new().key("x"), "m"))), &app);
    renderer.render(Some(tree(h("span", Props::new().key("x"), "m"))), &app);

    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><div><p>a</p><span>m</span><p>b</p></div></div>"#
    );
}

/// Test that a key change on the root remounts at the same position
#[test]
fn test_root_key_change_remounts() {
    let mut host = MemoryHost::new();
    let app = host.create_container("app");
    let _after = host.create_container("after");
    let mut renderer = Renderer::new(host);

    renderer.render(Some(h("p", Props::new().key(1), "one")), &app);
    renderer.render(Some(h("p", Props::new().key(2), "two")), &app);

    assert_eq!(
        renderer.host().to_markup(renderer.host().document()),
        r#"<div id="app"><p>two</p></div><div id="after"></div>"#
    );
}

/// Test that only an explicit null removes a property
#[test]
fn test_prop_removal_requires_explicit_null() {
    let (mut renderer, app) = setup();

    renderer.render(
        Some(h(
            "div",
            Props::new().attr("id", "a").attr("title", "t"),
            (),
        )),
        &app,
    );
    let div = *renderer.current(&app).unwrap().el().unwrap();
    renderer.host_mut().take_mutations();

    // `id` omitted, `title` nulled
    renderer.render(Some(h("div", Props::new().remove("title"), ())), &app);

    assert_eq!(
        renderer.host_mut().take_mutations(),
        vec![Mutation::PatchProp {
            node: div,
            key: "title".into(),
            prev: Some("t".into()),
            next: None,
        }]
    );
    assert_eq!(
        renderer.host().to_markup(app),
        r#"<div id="app"><div id="a"></div></div>"#
    );
}

/// Test that handlers are rebound only when the closure changes
#[test]
fn test_handler_rebinding() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let (mut renderer, app) = setup();
    let clicks = Arc::new(AtomicUsize::new(0));

    let handler: ripple_core::EventHandler = {
        let clicks = clicks.clone();
        Arc::new(move || {
            clicks.fetch_add(1, Ordering::SeqCst);
        })
    };
    let button = |handler: &ripple_core::EventHandler| {
        h(
            "button",
            Props::new().attr("onClick", handler.clone()),
            "go",
        )
    };

    renderer.render(Some(button(&handler)), &app);
    renderer.host_mut().take_mutations();

    renderer.render(Some(button(&handler)), &app);
    assert!(renderer.host().mutations().is_empty());

    let el = *renderer.current(&app).unwrap().el().unwrap();
    assert!(renderer.host().dispatch(el, "onClick"));
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    renderer.render(
        Some(h("button", Props::new().on("onClick", || {}), "go")),
        &app,
    );
    assert_eq!(take_stats(&mut renderer).prop_patches, 1);
}

/// Test that text nodes in a list update in place
#[test]
fn test_text_node_children_update_in_place() {
    let (mut renderer, app) = setup();

    renderer.render(
        Some(h("p", Props::new(), Children::from_iter(["a", "b"]))),
        &app,
    );
    renderer.host_mut().take_mutations();

    renderer.render(
        Some(h("p", Props::new(), Children::from_iter(["a", "c"]))),
        &app,
    );

    let mutations = renderer.host_mut().take_mutations();
    assert_eq!(mutations.len(), 1);
    assert!(matches!(&mutations[0], Mutation::SetText { text, .. } if text == "c"));
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p>ac</p></div>"#);
}

/// Test rendering through a selector
#[test]
fn test_render_to_selector() {
    let mut host = MemoryHost::new();
    let app = host.create_container("app");
    let mut renderer = Renderer::new(host);

    let container = renderer
        .render_to(Some(h("p", Props::new(), "hi")), "#app")
        .unwrap();
    assert_eq!(container, app);
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p>hi</p></div>"#);

    let err = renderer
        .render_to(Some(h("p", Props::new(), "hi")), "#nope")
        .unwrap_err();
    assert_eq!(err, RenderError::ContainerNotFound("#nope".into()));
}

/// Test that separate containers keep separate bindings
#[test]
fn test_containers_are_independent() {
    let mut host = MemoryHost::new();
    let left = host.create_container("left");
    let right = host.create_container("right");
    let mut renderer = Renderer::new(host);

    renderer.render(Some(list(&["a"])), &left);
    renderer.render(Some(list(&["b"])), &right);
    renderer.render(None, &left);

    assert!(renderer.current(&left).is_none());
    assert!(renderer.current(&right).is_some());
    assert_eq!(
        renderer.host().to_markup(right),
        r#"<div id="right"><ul><li>b</li></ul></div>"#
    );
}

/// Test that a text node without content mounts and later receives text
#[test]
fn test_empty_text_node_mounts_and_updates() {
    let (mut renderer, app) = setup();

    let empty: Node = VNode::try_new(VNodeType::Text, Props::new(), Children::None).unwrap();
    renderer.render(Some(h("p", Props::new(), vec![empty, VNode::text("b")])), &app);
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p>b</p></div>"#);
    renderer.host_mut().take_mutations();

    renderer.render(
        Some(h("p", Props::new(), vec![VNode::text("a"), VNode::text("b")])),
        &app,
    );

    let stats = take_stats(&mut renderer);
    assert_eq!(stats.text_writes, 1);
    assert_eq!(stats.total(), 1);
    assert_eq!(renderer.host().to_markup(app), r#"<div id="app"><p>ab</p></div>"#);
}

/// Test that a NaN-valued prop does not defeat idempotent re-rendering
#[test]
fn test_nan_prop_rerender_is_idempotent() {
    let (mut renderer, app) = setup();
    let node = || h("canvas", Props::new().attr("w", f64::NAN).attr("h", 2.5), ());

    renderer.render(Some(node()), &app);
    renderer.host_mut().take_mutations();
    renderer.render(Some(node()), &app);

    assert!(renderer.host().mutations().is_empty());
}

/// Test that mutation logging leaves the issued mutations unchanged
#[test]
fn test_log_mutations_matches_silent_render() {
    let run = |config: RendererConfig| {
        let mut host = MemoryHost::new();
        let app = host.create_container("app");
        let mut renderer = Renderer::with_config(host, config);
        renderer.render(Some(page()), &app);
        renderer.render(Some(list(&["c", "a", "d"])), &app);
        renderer.render(Some(list(&["d", "c"])), &app);
        let markup = renderer.host().to_markup(app);
        (renderer.host_mut().take_mutations(), markup)
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let logged = tracing::subscriber::with_default(subscriber, || {
        run(RendererConfig::strict().with_log_mutations(true))
    });
    let silent = run(RendererConfig::strict());

    assert!(!logged.0.is_empty());
    assert_eq!(logged, silent);
    assert_eq!(
        logged.1,
        r#"<div id="app"><ul><li>d</li><li>c</li></ul></div>"#
    );
}
