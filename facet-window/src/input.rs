use facet_scene::SceneEvent;
use winit::event::{ElementState, MouseButton};

/// Turns raw cursor and button notifications into [`SceneEvent`]s.
#[derive(Debug, Default)]
pub(crate) struct PointerTracker {
    dragging: bool,
    last: Option<(f64, f64)>,
}

impl PointerTracker {
    pub(crate) fn button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state.is_pressed();
        }
    }

    /// Events for a cursor move to `(x, y)` physical pixels.
    pub(crate) fn moved(&mut self, x: f64, y: f64) -> impl Iterator<Item = SceneEvent> + use<> {
        let drag = match self.last {
            Some((lx, ly)) if self.dragging => Some(SceneEvent::PointerDragged {
                dx: (x - lx) as f32,
                dy: (y - ly) as f32,
            }),
            _ => None,
        };
        self.last = Some((x, y));
        std::iter::once(SceneEvent::PointerMoved { x, y }).chain(drag)
    }

    pub(crate) fn left(&mut self) {
        self.last = None;
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_without_button_is_not_a_drag() {
        let mut tracker = PointerTracker::default();
        assert_eq!(
            tracker.moved(10.0, 20.0).collect::<Vec<_>>(),
            vec![SceneEvent::PointerMoved { x: 10.0, y: 20.0 }]
        );
        assert_eq!(tracker.moved(15.0, 20.0).count(), 1);
    }

    #[test]
    fn test_drag_reports_delta() {
        let mut tracker = PointerTracker::default();
        tracker.moved(10.0, 10.0).for_each(drop);
        tracker.button(MouseButton::Left, ElementState::Pressed);
        let events: Vec<_> = tracker.moved(13.0, 6.0).collect();
        assert_eq!(
            events,
            vec![
                SceneEvent::PointerMoved { x: 13.0, y: 6.0 },
                SceneEvent::PointerDragged { dx: 3.0, dy: -4.0 },
            ]
        );

        tracker.button(MouseButton::Left, ElementState::Released);
        assert_eq!(tracker.moved(20.0, 6.0).count(), 1);
    }

    #[test]
    fn test_leaving_window_resets_drag() {
        let mut tracker = PointerTracker::default();
        tracker.button(MouseButton::Left, ElementState::Pressed);
        tracker.moved(1.0, 1.0).for_each(drop);
        tracker.left();
        assert_eq!(tracker.moved(50.0, 50.0).count(), 1);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut tracker = PointerTracker::default();
        tracker.moved(0.0, 0.0).for_each(drop);
        tracker.button(MouseButton::Right, ElementState::Pressed);
        assert_eq!(tracker.moved(5.0, 5.0).count(), 1);
    }
}
