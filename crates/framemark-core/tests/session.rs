//! End-to-end review sessions driven through the public API.

use framemark_core::{
    Annotator, AnnotatorConfig, AnnotatorEvent, FrameArchive, FrameStore, MouseButton,
    PointerEvent, Shape, ToolKind,
};
use kurbo::Point;
use std::time::Duration;

fn drag(a: &mut Annotator, from: (f64, f64), to: (f64, f64)) {
    let down = Point::new(from.0, from.1);
    let up = Point::new(to.0, to.1);
    a.handle_pointer(PointerEvent::Down {
        position: down,
        button: MouseButton::Left,
    });
    a.handle_pointer(PointerEvent::Move { position: up });
    a.handle_pointer(PointerEvent::Up {
        position: up,
        button: MouseButton::Left,
    });
}

fn session() -> Annotator {
    Annotator::new(FrameStore::new(), AnnotatorConfig::default())
}

#[test]
fn annotations_follow_the_playhead() {
    let mut a = session();

    a.set_tool(ToolKind::Line);
    drag(&mut a, (10.0, 10.0), (100.0, 100.0));

    a.update_time(1.0);
    assert_eq!(a.current_frame(), 30);
    let drawings = a.all_frame_drawings();
    assert_eq!(drawings.len(), 1);
    assert_eq!(drawings[0].frame, 0);
    assert!(a.scene().is_empty());

    a.set_tool(ToolKind::Rectangle);
    drag(&mut a, (20.0, 20.0), (80.0, 70.0));

    a.update_time(0.0);
    assert_eq!(a.current_frame(), 0);
    assert_eq!(a.scene().len(), 1);
    assert!(matches!(a.scene().objects()[0], Shape::Line(_)));

    let frames = a.annotated_frames();
    assert_eq!(frames, vec![0, 30]);
}

#[test]
fn short_arrow_is_discarded_long_arrow_is_three_lines() {
    let mut a = session();
    a.set_tool(ToolKind::Arrow);

    drag(&mut a, (10.0, 10.0), (15.0, 10.0));
    assert_eq!(a.scene().len(), 0);

    drag(&mut a, (10.0, 10.0), (60.0, 10.0));
    assert_eq!(a.scene().len(), 3);
    assert!(a.scene().objects().iter().all(|s| matches!(s, Shape::Line(_))));
}

#[test]
fn small_rectangle_is_discarded() {
    let mut a = session();
    a.set_tool(ToolKind::Rectangle);
    drag(&mut a, (10.0, 10.0), (13.0, 40.0));
    assert!(a.scene().is_empty());
    assert!(a.scene().preview().is_none());
}

#[test]
fn pen_stroke_is_committed() {
    let mut a = session();
    a.handle_pointer(PointerEvent::Down {
        position: Point::new(0.0, 0.0),
        button: MouseButton::Left,
    });
    for i in 1..=20 {
        let x = i as f64 * 5.0;
        a.handle_pointer(PointerEvent::Move {
            position: Point::new(x, (x / 10.0).sin() * 20.0),
        });
    }
    a.handle_pointer(PointerEvent::Up {
        position: Point::new(100.0, 0.0),
        button: MouseButton::Left,
    });

    assert_eq!(a.scene().len(), 1);
    assert!(matches!(a.scene().objects()[0], Shape::Freehand(_)));
}

#[test]
fn secondary_button_does_not_draw() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    a.handle_pointer(PointerEvent::Down {
        position: Point::ZERO,
        button: MouseButton::Right,
    });
    a.handle_pointer(PointerEvent::Up {
        position: Point::new(50.0, 50.0),
        button: MouseButton::Right,
    });
    assert!(a.scene().is_empty());
}

#[test]
fn leaving_a_frame_flushes_its_drawing() {
    let mut a = session();
    a.update_time(10.5 / 30.0);
    assert_eq!(a.current_frame(), 10);

    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (50.0, 50.0));
    assert!(a.has_pending_save());

    a.update_time(11.5 / 30.0);
    assert!(a.store().contains(10));
    assert!(!a.has_pending_save());
}

#[test]
fn history_is_bounded() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    for i in 0..25 {
        let y = i as f64 * 4.0;
        drag(&mut a, (0.0, y), (60.0, y));
    }
    assert_eq!(a.scene().len(), 25);

    let mut undone = 0;
    for _ in 0..25 {
        if a.undo() {
            undone += 1;
        }
    }
    assert_eq!(undone, 20);
    assert_eq!(a.scene().len(), 5);
}

#[test]
fn new_commit_invalidates_redo() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    assert!(a.undo());
    assert!(a.can_redo());

    drag(&mut a, (0.0, 20.0), (60.0, 20.0));
    assert!(!a.can_redo());
    assert!(!a.redo());
}

#[test]
fn history_does_not_cross_frames() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.update_time(2.0);
    assert!(!a.can_undo());
    a.update_time(0.0);
    assert!(!a.can_undo());
    assert_eq!(a.scene().len(), 1);
}

#[test]
fn reload_then_save_reproduces_the_drawing() {
    let mut a = session();
    a.set_tool(ToolKind::Rectangle);
    drag(&mut a, (10.0, 10.0), (90.0, 60.0));
    a.set_tool(ToolKind::Arrow);
    drag(&mut a, (0.0, 0.0), (80.0, 80.0));
    a.force_save();
    let saved = a.store().load(0).unwrap();

    a.load_frame(0);
    a.save_frame(0);
    assert_eq!(a.store().load(0).unwrap(), saved);
}

#[test]
fn empty_frames_are_never_stored() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.force_save();
    assert!(a.store().contains(0));

    a.undo();
    a.force_save();
    assert!(!a.store().contains(0));

    a.update_time(3.0);
    a.update_time(0.0);
    assert!(a.store().is_empty());
    assert!(a.all_frame_drawings().iter().all(|d| d.frame != 90));
}

#[test]
fn debounced_save_fires_after_quiet_period() {
    let mut a = session();
    let start = a.now();
    a.set_tool(ToolKind::Line);

    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.tick(start + Duration::from_millis(60));
    drag(&mut a, (0.0, 10.0), (60.0, 10.0));
    a.tick(start + Duration::from_millis(120));
    assert!(!a.store().contains(0));

    a.tick(start + Duration::from_millis(200));
    assert_eq!(a.store().load(0).unwrap().map(|s| s.len()), Some(2));
}

#[test]
fn session_remount_keeps_annotations() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.update_time(1.0);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.force_save();

    let store = a.dispose();
    let mut b = Annotator::new(store, AnnotatorConfig::default());
    assert_eq!(b.scene().len(), 1);
    assert_eq!(b.annotated_frames(), vec![0, 30]);
    assert_eq!(b.next_annotated_frame(b.current_frame()), Some(30));

    b.update_time(1.0);
    assert_eq!(b.scene().len(), 1);
    assert_eq!(b.previous_annotated_frame(b.current_frame()), Some(0));
}

#[test]
fn archive_survives_a_remount() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut a = session();
    a.set_tool(ToolKind::Rectangle);
    drag(&mut a, (10.0, 10.0), (90.0, 60.0));
    a.force_save();
    FrameArchive::from_store(a.store(), a.config().frame_rate)
        .write_to(&path)
        .unwrap();

    let store = FrameArchive::read_from(&path).unwrap().into_store();
    let b = Annotator::new(store, AnnotatorConfig::default());
    assert_eq!(b.scene().len(), 1);
    assert!(matches!(b.scene().objects()[0], Shape::Rectangle(_)));
}

#[test]
fn events_report_saves_and_loads() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.drain_events();

    a.update_time(1.0);
    let events = a.drain_events();
    assert!(events.contains(&AnnotatorEvent::FrameSaved {
        frame: 0,
        objects: 1
    }));
    assert!(events.contains(&AnnotatorEvent::FrameChanged {
        from: Some(0),
        to: 30
    }));
    assert!(events.contains(&AnnotatorEvent::FrameLoaded {
        frame: 30,
        objects: 0
    }));
}

#[test]
fn non_finite_pointer_cannot_corrupt_a_frame() {
    let mut a = session();
    a.set_tool(ToolKind::Line);
    drag(&mut a, (0.0, 0.0), (60.0, 0.0));
    a.set_tool(ToolKind::Rectangle);
    drag(&mut a, (10.0, 10.0), (f64::NAN, 50.0));
    assert_eq!(a.scene().len(), 1);

    a.force_save();
    a.update_time(1.0);
    a.update_time(0.0);
    assert_eq!(a.scene().len(), 1);
    assert!(
        !a.drain_events()
            .iter()
            .any(|e| matches!(e, AnnotatorEvent::LoadFailed { .. }))
    );
}
