use pagemark::engine::FixedPageRenderer;
use pagemark::model::{ImageOverlay, TextOverlay};
use pagemark::scene::{LoadedAsset, ManualAssetLoader, SceneSurface};
use pagemark::{
    Config, EditorSession, MemoryScene, Overlay, OverlayId, OverlayKind, OverlayPatch,
    SceneEvent, Tool,
};

type Session = EditorSession<MemoryScene, ManualAssetLoader, FixedPageRenderer>;

fn session_at(scale: f64) -> Session {
    let mut session = EditorSession::new(
        &Config::default(),
        MemoryScene::new(),
        ManualAssetLoader::new(),
        FixedPageRenderer::letter(2),
    )
    .unwrap();
    session.set_view(1, scale).unwrap();
    session
}

fn text(id: &str, x: f64, y: f64) -> Overlay {
    Overlay::new(id, 1, OverlayKind::Text(TextOverlay::new("New text")))
        .at(x, y)
        .sized(200.0, 40.0)
}

fn image(id: &str, src: &str) -> Overlay {
    Overlay::new(id, 1, OverlayKind::Image(ImageOverlay::from_src(src)))
        .at(10.0, 10.0)
        .sized(100.0, 50.0)
}

fn sorted(mut ids: Vec<OverlayId>) -> Vec<OverlayId> {
    ids.sort();
    ids
}

#[test]
fn text_overlay_lifecycle_across_zoom() {
    let mut session = session_at(1.5);
    assert_eq!(session.document().page_width, 612.0);
    assert_eq!(session.document().page_height, 792.0);

    session.add_overlay(text("t1", 80.0, 120.0)).unwrap();
    let node = session.surface().find_bound(&"t1".into()).unwrap();
    assert_eq!((node.props.x, node.props.y), (120.0, 180.0));
    assert_eq!(node.props.text.as_deref(), Some("New text"));

    session.surface_mut().reset_mutations();
    session
        .update_overlay(&"t1".into(), &OverlayPatch::text("Edited"))
        .unwrap();
    let edited = session.surface().find_bound(&"t1".into()).unwrap();
    assert_eq!(edited.id, node.id);
    assert_eq!(edited.props.text.as_deref(), Some("Edited"));
    assert_eq!(session.surface().mutations().inserts, 0);

    assert!(session.remove_overlay(&"t1".into()));
    assert!(session.surface().is_empty());

    session.set_scale(2.0).unwrap();
    session.add_overlay(text("t1", 80.0, 120.0)).unwrap();
    let node = session.surface().find_bound(&"t1".into()).unwrap();
    assert_eq!((node.props.x, node.props.y), (160.0, 240.0));
    assert_eq!(session.surface().size(), (1224.0, 1584.0));
}

#[test]
fn second_pass_without_changes_is_a_noop() {
    let mut session = session_at(1.5);
    session.add_overlay(text("a", 0.0, 0.0)).unwrap();
    session.add_overlay(text("b", 50.0, 50.0)).unwrap();

    session.surface_mut().reset_mutations();
    let report = session.reconcile();

    assert!(report.is_noop());
    assert_eq!(session.surface().mutations().total(), 0);
}

#[test]
fn bound_nodes_match_overlays_on_the_page() {
    let mut session = session_at(1.0);
    session.add_overlay(text("a", 0.0, 0.0)).unwrap();
    session.add_overlay(text("b", 10.0, 0.0)).unwrap();
    session
        .add_overlay(Overlay::new("c", 2, OverlayKind::Text(TextOverlay::new("p2"))))
        .unwrap();
    session.remove_overlay(&"a".into());

    assert_eq!(
        sorted(session.surface().bound_ids()),
        vec![OverlayId::from("b")]
    );

    session.set_view(2, 1.0).unwrap();
    assert_eq!(session.surface().bound_ids(), vec![OverlayId::from("c")]);
}

#[test]
fn zoom_changes_never_drift_the_model() {
    let mut session = session_at(1.0);
    session.add_overlay(text("t1", 80.0, 120.0)).unwrap();

    for scale in [1.5, 0.3, 2.0, 1.1, 4.0, 1.0] {
        session.set_scale(scale).unwrap();
    }

    let overlay = session.store().overlay(&"t1".into()).unwrap();
    assert_eq!((overlay.x, overlay.y), (80.0, 120.0));
    let node = session.surface().find_bound(&"t1".into()).unwrap();
    assert_eq!((node.props.x, node.props.y), (80.0, 120.0));
}

#[test]
fn editing_node_survives_updates_to_other_overlays() {
    let mut session = session_at(1.0);
    session.add_overlay(text("a", 0.0, 0.0)).unwrap();
    session.add_overlay(text("b", 300.0, 300.0)).unwrap();

    let a_node = session.surface().find_bound(&"a".into()).unwrap().id;
    let event = session.surface().double_click(5.0, 5.0);
    session.dispatch(event).unwrap();
    assert!(session.surface().is_editing(a_node));

    for event in session.surface_mut().drain_events() {
        session.dispatch(event).unwrap();
    }

    session
        .update_overlay(&"b".into(), &OverlayPatch::position(320.0, 320.0))
        .unwrap();

    assert_eq!(session.surface().find_bound(&"a".into()).unwrap().id, a_node);
    assert!(session.surface().is_editing(a_node));
}

#[test]
fn removed_image_never_appears_after_its_load_finishes() {
    let mut session = session_at(1.0);
    session.add_overlay(image("img", "/tmp/pic.png")).unwrap();
    assert!(session.surface().is_empty());
    assert_eq!(session.loader().pending().len(), 1);

    session.remove_overlay(&"img".into());
    session.loader_mut().resolve(
        &"img".into(),
        Ok(LoadedAsset {
            natural_width: 64,
            natural_height: 32,
        }),
    );

    assert_eq!(session.pump_assets(), 0);
    assert!(session.surface().is_empty());
}

#[test]
fn image_appears_once_its_load_finishes() {
    let mut session = session_at(2.0);
    session.add_overlay(image("img", "/tmp/pic.png")).unwrap();
    session.loader_mut().resolve(
        &"img".into(),
        Ok(LoadedAsset {
            natural_width: 64,
            natural_height: 32,
        }),
    );

    assert_eq!(session.pump_assets(), 1);
    let node = session.surface().find_bound(&"img".into()).unwrap();
    assert_eq!((node.props.x, node.props.y), (20.0, 20.0));
    assert_eq!((node.props.width, node.props.height), (200.0, 100.0));
    assert_eq!(node.props.natural_size, Some((64, 32)));
}

#[test]
fn text_tool_click_type_and_blur_updates_model() {
    let mut session = session_at(2.0);
    session.set_tool(Tool::Text);

    let click = session.surface().click(200.0, 100.0);
    session.dispatch(click).unwrap();

    let id = session.store().selected_id().cloned().unwrap();
    let overlay = session.store().overlay(&id).unwrap();
    assert_eq!((overlay.x, overlay.y), (100.0, 50.0));

    let node = session.surface().find_bound(&id).unwrap().id;
    let entered = session.surface_mut().drain_events();
    assert_eq!(entered, vec![SceneEvent::EditEntered { node }]);
    for event in entered {
        session.dispatch(event).unwrap();
    }

    let typed = session.surface_mut().type_text(node, "Signed copy").unwrap();
    session.dispatch(typed).unwrap();
    let blur = session.surface_mut().exit_edit().unwrap();
    session.dispatch(blur).unwrap();

    match &session.store().overlay(&id).unwrap().kind {
        OverlayKind::Text(text) => assert_eq!(text.text, "Signed copy"),
        other => panic!("expected text overlay, got {other:?}"),
    }
    assert!(session.router().pending_edit().is_none());
    assert_eq!(session.export_snapshot().overlays.len(), 1);
}
