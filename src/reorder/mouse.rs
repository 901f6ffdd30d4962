use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::engine::{DragEngine, DragHooks};

/// Feed one terminal mouse event to the engine. Returns `true` when the event
/// belonged to a drag gesture and should not be handled further.
pub fn route_mouse<T, H>(engine: &mut DragEngine<T>, mouse: MouseEvent, items: &[T], hooks: &mut H) -> bool
where
    T: Clone,
    H: DragHooks<T>,
{
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => engine.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => {
            engine.pointer_moved(mouse.row, items, hooks);
            engine.is_dragging()
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let was_dragging = engine.is_dragging();
            engine.release(hooks);
            was_dragging
        }
        _ => false,
    }
}
