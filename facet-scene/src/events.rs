//! Input messages queued between window callbacks and the frame loop.

use std::collections::VecDeque;

/// Something the scene must react to on its next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// Pointer position in client pixels, origin top-left.
    PointerMoved { x: f64, y: f64 },
    /// Pointer movement in pixels while the orbit button is held.
    PointerDragged { dx: f32, dy: f32 },
    Resized { width: u32, height: u32 },
    PixelRatioChanged(f64),
}

/// FIFO of [`SceneEvent`]s, drained once per frame.
///
/// A new event of the same kind as the one at the back of the queue replaces
/// it (drags accumulate instead), so bursts of pointer or resize notifications
/// collapse to their latest value.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SceneEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SceneEvent) {
        if let Some(back) = self.events.back_mut() {
            match (back, event) {
                (
                    SceneEvent::PointerDragged { dx, dy },
                    SceneEvent::PointerDragged { dx: ndx, dy: ndy },
                ) => {
                    *dx += ndx;
                    *dy += ndy;
                    return;
                }
                (back @ SceneEvent::PointerMoved { .. }, SceneEvent::PointerMoved { .. })
                | (back @ SceneEvent::Resized { .. }, SceneEvent::Resized { .. })
                | (back @ SceneEvent::PixelRatioChanged(_), SceneEvent::PixelRatioChanged(_)) => {
                    *back = event;
                    return;
                }
                _ => {}
            }
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SceneEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::PointerMoved { x: 1.0, y: 2.0 });
        queue.push(SceneEvent::Resized {
            width: 10,
            height: 20,
        });
        queue.push(SceneEvent::PointerMoved { x: 3.0, y: 4.0 });

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![
                SceneEvent::PointerMoved { x: 1.0, y: 2.0 },
                SceneEvent::Resized {
                    width: 10,
                    height: 20
                },
                SceneEvent::PointerMoved { x: 3.0, y: 4.0 },
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_consecutive_moves_coalesce() {
        let mut queue = EventQueue::new();
        for i in 0..10 {
            queue.push(SceneEvent::PointerMoved {
                x: f64::from(i),
                y: 0.0,
            });
        }
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.drain().next(),
            Some(SceneEvent::PointerMoved { x: 9.0, y: 0.0 })
        );
    }

    #[test]
    fn test_consecutive_resizes_coalesce() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::Resized {
            width: 1,
            height: 1,
        });
        queue.push(SceneEvent::Resized {
            width: 640,
            height: 480,
        });
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![SceneEvent::Resized {
                width: 640,
                height: 480
            }]
        );
    }

    #[test]
    fn test_drags_accumulate() {
        let mut queue = EventQueue::new();
        queue.push(SceneEvent::PointerDragged { dx: 1.0, dy: -2.0 });
        queue.push(SceneEvent::PointerDragged { dx: 3.0, dy: 1.0 });
        assert_eq!(
            queue.drain().collect::<Vec<_>>(),
            vec![SceneEvent::PointerDragged { dx: 4.0, dy: -1.0 }]
        );
    }
}
