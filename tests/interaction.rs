use std::cell::RefCell;
use std::rc::Rc;

use eframe_ink::event::EditorEvent;
use eframe_ink::input::{Button, InputMode, Phase, RawEvent};
use eframe_ink::{EditorContext, Settings, StateKind, ToolKind};
use egui::{Pos2, pos2, vec2};

fn editor() -> EditorContext {
    EditorContext::new(Settings::default())
}

fn mouse(ed: &mut EditorContext, phase: Phase, button: Button, pos: Pos2) {
    ed.handle_raw_event(&RawEvent::mouse(phase, button, pos));
}

/// Press, move through `path`, release at the last point.
fn drag(ed: &mut EditorContext, button: Button, path: &[Pos2]) {
    let (last, rest) = path.split_last().expect("non-empty path");
    let (first, middle) = rest.split_first().expect("at least two points");
    mouse(ed, Phase::Press, button, *first);
    for pos in middle {
        mouse(ed, Phase::Move, button, *pos);
    }
    mouse(ed, Phase::Release, button, *last);
}

fn square_lasso(min: f32, max: f32) -> Vec<Pos2> {
    vec![
        pos2(min, min),
        pos2(max, min),
        pos2(max, max),
        pos2(min, max),
        pos2(min, min),
    ]
}

/// One stroke inside the 0..100 square and one far outside it.
fn editor_with_two_strokes() -> EditorContext {
    let mut ed = editor();
    drag(&mut ed, Button::Primary, &[pos2(20.0, 20.0), pos2(30.0, 30.0), pos2(40.0, 40.0)]);
    drag(&mut ed, Button::Primary, &[pos2(300.0, 300.0), pos2(310.0, 310.0)]);
    ed
}

#[test]
fn drawing_commits_one_stroke() {
    let mut ed = editor();
    drag(&mut ed, Button::Primary, &[pos2(10.0, 10.0), pos2(20.0, 20.0), pos2(30.0, 30.0)]);

    let page = &ed.document().pages[0];
    assert_eq!(page.strokes.len(), 1);
    assert_eq!(
        page.strokes[0].points(),
        &[pos2(10.0, 10.0), pos2(20.0, 20.0), pos2(30.0, 30.0)]
    );
    assert_eq!(page.strokes[0].pen_width(), Settings::default().pen_width);
    assert_eq!(ed.state_kind(), StateKind::Idle);
    assert_eq!(ed.history().undo_stack().len(), 1);
    assert!(ed.document().is_modified());
}

#[test]
fn drawing_announces_state_changes() {
    let mut ed = editor();
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        ed.event_bus.subscribe(move |event: &EditorEvent| {
            if let EditorEvent::StateChanged { old, new } = event {
                seen.borrow_mut().push((*old, *new));
            }
        });
    }

    drag(&mut ed, Button::Primary, &[pos2(10.0, 10.0), pos2(20.0, 20.0)]);

    assert_eq!(
        *seen.borrow(),
        vec![
            (StateKind::Idle, StateKind::Drawing),
            (StateKind::Drawing, StateKind::Idle),
        ]
    );
}

#[test]
fn undo_is_ignored_mid_gesture() {
    let mut ed = editor();
    drag(&mut ed, Button::Primary, &[pos2(10.0, 10.0), pos2(20.0, 20.0)]);
    mouse(&mut ed, Phase::Press, Button::Primary, pos2(50.0, 50.0));
    assert_eq!(ed.state_kind(), StateKind::Drawing);
    assert!(!ed.can_undo());

    ed.undo();
    assert_eq!(ed.document().pages[0].strokes.len(), 1);

    mouse(&mut ed, Phase::Release, Button::Primary, pos2(60.0, 60.0));
    assert!(ed.can_undo());
}

#[test]
fn lasso_selects_only_contained_strokes() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    assert_eq!(ed.state_kind(), StateKind::Selected);
    let selection = ed.selection().expect("selection");
    assert_eq!(selection.strokes().len(), 1);
    assert_eq!(selection.strokes()[0].points()[0], pos2(20.0, 20.0));
    assert_eq!(ed.document().pages[0].strokes.len(), 1);
}

#[test]
fn empty_lasso_returns_to_idle() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(500.0, 550.0));

    assert_eq!(ed.state_kind(), StateKind::Idle);
    assert!(ed.selection().is_none());
    assert_eq!(ed.document().pages[0].strokes.len(), 2);
}

#[test]
fn right_click_lasso_restores_the_pen() {
    let mut ed = editor_with_two_strokes();
    assert_eq!(ed.current_tool(), ToolKind::Pen);

    mouse(&mut ed, Phase::Press, Button::Secondary, pos2(0.0, 0.0));
    assert_eq!(ed.current_tool(), ToolKind::Select);
    assert_eq!(ed.state_kind(), StateKind::Selecting);
    for pos in &square_lasso(0.0, 100.0)[1..4] {
        mouse(&mut ed, Phase::Move, Button::Secondary, *pos);
    }
    mouse(&mut ed, Phase::Release, Button::Secondary, pos2(0.0, 0.0));

    assert_eq!(ed.state_kind(), StateKind::Selected);
    assert_eq!(ed.current_tool(), ToolKind::Pen);
}

#[test]
fn dragging_inside_moves_the_selection() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    mouse(&mut ed, Phase::Press, Button::Primary, pos2(30.0, 30.0));
    assert_eq!(ed.state_kind(), StateKind::ModifyingSelection);
    mouse(&mut ed, Phase::Move, Button::Primary, pos2(80.0, 30.0));
    mouse(&mut ed, Phase::Release, Button::Primary, pos2(80.0, 30.0));

    assert_eq!(ed.state_kind(), StateKind::Selected);
    let selection = ed.selection().expect("selection");
    assert_eq!(selection.strokes()[0].points()[0], pos2(70.0, 20.0));
    assert_eq!(selection.polygon()[0], pos2(50.0, 0.0));

    ed.undo();
    let selection = ed.selection().expect("selection after undo");
    assert_eq!(selection.strokes()[0].points()[0], pos2(20.0, 20.0));
}

#[test]
fn pressing_outside_releases_the_selection() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    mouse(&mut ed, Phase::Press, Button::Primary, pos2(500.0, 500.0));
    mouse(&mut ed, Phase::Release, Button::Primary, pos2(500.0, 500.0));

    assert_eq!(ed.state_kind(), StateKind::Idle);
    assert!(ed.selection().is_none());
    assert_eq!(ed.document().pages[0].strokes.len(), 2);
}

#[test]
fn eraser_tip_removes_touched_strokes() {
    let mut ed = editor_with_two_strokes();
    ed.handle_raw_event(&RawEvent::eraser(Phase::Press, pos2(30.0, 30.0), 1.0));
    assert_eq!(ed.current_tool(), ToolKind::Eraser);
    ed.handle_raw_event(&RawEvent::eraser(Phase::Release, pos2(30.0, 30.0), 0.0));

    let page = &ed.document().pages[0];
    assert_eq!(page.strokes.len(), 1);
    assert_eq!(page.strokes[0].points()[0], pos2(300.0, 300.0));
    assert_eq!(ed.current_tool(), ToolKind::Pen);

    ed.undo();
    assert_eq!(ed.document().pages[0].strokes.len(), 2);
}

#[test]
fn eraser_tool_erases_along_the_drag() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Eraser);
    drag(
        &mut ed,
        Button::Primary,
        &[pos2(200.0, 200.0), pos2(305.0, 305.0), pos2(30.0, 30.0), pos2(30.0, 30.0)],
    );

    assert!(ed.document().pages[0].strokes.is_empty());
    assert_eq!(ed.history().undo_stack().len(), 4);
    assert_eq!(ed.current_tool(), ToolKind::Eraser);
}

#[test]
fn middle_button_pans_and_restores_the_tool() {
    let mut ed = editor();
    mouse(&mut ed, Phase::Press, Button::Middle, pos2(100.0, 100.0));
    assert!(ed.is_panning());
    assert_eq!(ed.current_tool(), ToolKind::Hand);

    mouse(&mut ed, Phase::Move, Button::Middle, pos2(100.0, 60.0));
    assert_eq!(ed.scroll(), vec2(0.0, 40.0));

    mouse(&mut ed, Phase::Release, Button::Middle, pos2(100.0, 60.0));
    assert!(!ed.is_panning());
    assert_eq!(ed.current_tool(), ToolKind::Pen);
    assert_eq!(ed.state_kind(), StateKind::Idle);
}

#[test]
fn cut_then_paste_restores_a_selection() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    ed.cut();
    assert_eq!(ed.state_kind(), StateKind::Idle);
    assert!(ed.selection().is_none());
    assert!(!ed.clipboard().is_empty());
    assert_eq!(ed.document().pages[0].strokes.len(), 1);

    ed.paste();
    assert_eq!(ed.state_kind(), StateKind::Selected);
    assert_eq!(ed.selection().expect("pasted").strokes().len(), 1);

    ed.undo();
    assert!(ed.selection().is_none());
    assert_eq!(ed.state_kind(), StateKind::Idle);
}

#[test]
fn tablet_mode_ignores_the_mouse() {
    let mut ed = editor();
    ed.set_input_mode(InputMode::Tablet);
    drag(&mut ed, Button::Primary, &[pos2(10.0, 10.0), pos2(20.0, 20.0)]);
    assert!(ed.document().pages[0].strokes.is_empty());

    ed.handle_raw_event(&RawEvent::stylus(Phase::Press, pos2(10.0, 10.0), 0.5));
    ed.handle_raw_event(&RawEvent::stylus(Phase::Move, pos2(20.0, 20.0), 0.5));
    ed.handle_raw_event(&RawEvent::stylus(Phase::Release, pos2(30.0, 30.0), 0.5));
    assert_eq!(ed.document().pages[0].strokes.len(), 1);
}

#[test]
fn recoloring_a_selection_is_undoable() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    ed.set_color(egui::Color32::RED);
    assert_eq!(ed.selection().expect("selection").strokes()[0].color(), egui::Color32::RED);

    ed.undo();
    assert_eq!(ed.selection().expect("selection").strokes()[0].color(), egui::Color32::BLACK);
}

fn stroke_counts(ed: &EditorContext) -> Vec<usize> {
    ed.document().pages.iter().map(|p| p.strokes.len()).collect()
}

#[test]
fn inserting_a_page_first_keeps_the_selection_on_its_page() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));

    ed.page_add_beginning();
    assert_eq!(ed.selection().expect("selection").page(), 1);

    ed.release_selection();
    assert_eq!(stroke_counts(&ed), vec![0, 2]);

    ed.undo();
    ed.undo();
    assert_eq!(ed.selection().expect("selection").page(), 0);
    assert_eq!(stroke_counts(&ed), vec![1]);
}

#[test]
fn the_selection_page_cannot_be_removed() {
    let mut ed = editor_with_two_strokes();
    ed.page_add_end();
    ed.set_tool(ToolKind::Select);
    drag(&mut ed, Button::Primary, &square_lasso(0.0, 100.0));
    let undo_depth = ed.history().undo_stack().len();

    ed.page_remove();
    assert_eq!(ed.document().page_count(), 2);
    assert_eq!(ed.history().undo_stack().len(), undo_depth);

    ed.release_selection();
    assert_eq!(stroke_counts(&ed), vec![2, 0]);
}

#[test]
fn undo_is_ignored_while_the_eraser_is_down() {
    let mut ed = editor_with_two_strokes();
    ed.set_tool(ToolKind::Eraser);
    mouse(&mut ed, Phase::Press, Button::Primary, pos2(30.0, 30.0));
    assert_eq!(ed.state_kind(), StateKind::Idle);
    assert_eq!(ed.history().undo_stack().len(), 3);
    assert!(!ed.can_undo());

    ed.undo();
    assert_eq!(ed.history().undo_stack().len(), 3);
    assert_eq!(ed.document().pages[0].strokes.len(), 1);

    mouse(&mut ed, Phase::Move, Button::Primary, pos2(305.0, 305.0));
    mouse(&mut ed, Phase::Release, Button::Primary, pos2(305.0, 305.0));
    assert!(ed.document().pages[0].strokes.is_empty());
    assert!(ed.can_undo());
}

#[test]
fn page_edits_wait_for_a_pan_to_finish() {
    let mut ed = editor_with_two_strokes();
    mouse(&mut ed, Phase::Press, Button::Middle, pos2(100.0, 100.0));
    assert!(ed.is_panning());
    assert!(!ed.can_undo());

    ed.page_add_end();
    ed.undo();
    assert_eq!(ed.document().page_count(), 1);
    assert_eq!(ed.document().pages[0].strokes.len(), 2);

    mouse(&mut ed, Phase::Release, Button::Middle, pos2(100.0, 100.0));
    assert!(ed.can_undo());
}
