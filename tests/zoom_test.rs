use tablature_wasm::layout::{Axis, SurfaceHint};
use tablature_wasm::{Event, Note, Tuning, Workspace};

fn song() -> Vec<Event> {
    ["C4", "E4", "G4", "A4", "D5"]
        .iter()
        .map(|p| Note::new(p.parse().unwrap(), 4.0).into())
        .collect()
}

fn workspace(views: &[&str]) -> Workspace {
    let tuning: Tuning = "C-D-E-G-A".parse().unwrap();
    let mut ws = Workspace::default();
    for id in views {
        ws.load_view(id, tuning.clone(), song(), SurfaceHint::default()).unwrap();
    }
    ws
}

#[test]
fn test_zoom_round_trip_restores_base_coordinates() {
    let mut ws = workspace(&["main"]);
    let before = ws.scene("main").unwrap().clone();

    ws.set_zoom("main", Axis::X, 150.0).unwrap();
    ws.set_zoom("main", Axis::Y, 73.0).unwrap();
    ws.set_zoom("main", Axis::X, 100.0).unwrap();
    ws.set_zoom("main", Axis::Y, 100.0).unwrap();

    assert_eq!(ws.scene("main").unwrap(), &before);
}

#[test]
fn test_live_coordinates_scale_from_base() {
    let mut ws = workspace(&["main"]);
    ws.set_zoom("main", Axis::X, 200.0).unwrap();
    ws.set_zoom("main", Axis::Y, 50.0).unwrap();
    let scene = ws.scene("main").unwrap();

    for note in &scene.notes {
        assert_eq!(note.x, note.base_x * 2.0);
        assert_eq!(note.y, note.base_y * 0.5);
        assert_eq!(note.radius, 12.0);
    }
    assert_eq!(scene.width, scene.base_width * 2.0);

    // Labels pivot about x = 60
    let string = &scene.strings[0];
    assert_eq!(string.label_x, -20.0);
    assert_eq!(string.line_start_x, 140.0);
    assert_eq!(string.y, string.base_y * 0.5);

    for path in &scene.paths {
        assert_eq!(path.x_to, path.base_x_to * 2.0);
        let length = (path.x_to - path.x_from).hypot(path.y_to - path.y_from);
        assert_eq!(path.chevrons.len(), (length / 9.0).floor() as usize);
    }
}

#[test]
fn test_linked_views_follow_each_other() {
    let mut ws = workspace(&["a", "b", "c", "d"]);
    ws.link("a", "b").unwrap();
    ws.link("b", "c").unwrap();

    let changes = ws.set_zoom("c", Axis::X, 250.0).unwrap();
    let mut views: Vec<&str> = changes.iter().map(|c| c.view.as_str()).collect();
    views.sort();
    assert_eq!(views, vec!["a", "b", "c"]);
    assert!(changes.iter().all(|c| c.percent == 250.0 && c.axis == Axis::X));

    assert_eq!(ws.zoom_state("a").unwrap().x_scale, 2.5);
    assert_eq!(ws.zoom_state("d").unwrap().x_scale, 1.0);
    assert_eq!(ws.scene("a").unwrap().notes[1].x, ws.scene("a").unwrap().notes[1].base_x * 2.5);

    assert!(ws.unlink("a", "b"));
    ws.set_zoom("a", Axis::X, 100.0).unwrap();
    assert_eq!(ws.zoom_state("b").unwrap().x_scale, 2.5);
}

#[test]
fn test_link_syncs_target_to_source() {
    let mut ws = workspace(&["a", "b"]);
    ws.set_zoom("a", Axis::Y, 180.0).unwrap();
    ws.link("a", "b").unwrap();
    assert_eq!(ws.zoom_state("b").unwrap().y_scale, 1.8);
    assert!(ws.is_linked("b", "a"));
}

#[test]
fn test_fit_to_width() {
    let mut ws = workspace(&["main"]);
    // 5 quarter notes: 150 + 5 * 340 + 400
    let base_width = ws.scene("main").unwrap().base_width;
    assert_eq!(base_width, 2250.0);

    let changes = ws.fit_to_width("main", 1155.0).unwrap();
    assert_eq!(changes[0].percent, 50.0);
    assert_eq!(ws.scene("main").unwrap().width, 1125.0);
}

#[test]
fn test_zoom_is_clamped() {
    let mut ws = workspace(&["main"]);
    ws.set_zoom("main", Axis::X, 10_000.0).unwrap();
    assert_eq!(ws.zoom_state("main").unwrap().x_scale, 4.0);
    ws.set_zoom("main", Axis::X, 0.0).unwrap();
    assert_eq!(ws.zoom_state("main").unwrap().x_scale, 0.01);
    assert!(ws.set_zoom("missing", Axis::X, 100.0).is_err());
}

#[test]
fn test_vibrato_waves_rescale_with_zoom() {
    let mut ws = workspace(&["main"]);
    ws.enable_vibrato("main", &["C".parse().unwrap(), "E".parse().unwrap()]).unwrap();
    let base: Vec<_> = ws.vibratos("main").unwrap().to_vec();
    assert_eq!(base.len(), 2);

    ws.set_zoom("main", Axis::X, 250.0).unwrap();
    ws.set_zoom("main", Axis::Y, 40.0).unwrap();
    for (live, before) in ws.vibratos("main").unwrap().iter().zip(&base) {
        assert_eq!(live.x_from, live.base_x_from * 2.5 + live.from_offset);
        assert_eq!(live.y, live.base_y * 0.4);
        assert!((live.amplitude - before.amplitude * 0.4).abs() < 1e-9);
        // Cycle count tracks musical length, not pixels
        assert!((live.cycles - before.cycles).abs() < 0.1);
        assert!(live.points.iter().all(|p| p.x >= live.x_from - 1e-9 && p.x <= live.x_to + 1e-9));
    }

    ws.reset_zoom("main").unwrap();
    assert_eq!(ws.vibratos("main").unwrap(), &base[..]);
}
