use glam::Vec2;

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Map a client-space pixel position to normalized device coordinates.
///
/// `(0, 0)` is the top-left corner and maps to `(-1, 1)`; the bottom-right
/// corner maps to `(1, -1)`. `None` for an empty viewport.
pub fn normalize_client(client: Vec2, viewport: Viewport) -> Option<Vec2> {
    if viewport.is_empty() {
        return None;
    }
    let x = client.x / viewport.width as f32 * 2.0 - 1.0;
    let y = -(client.y / viewport.height as f32) * 2.0 + 1.0;
    Some(Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE))
}

/// Latest pointer position in normalized device coordinates.
///
/// Until the first move the pointer is unknown and the shader sees the
/// viewport size in pixels, which lies far outside the [-1, 1] range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    position: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Value for the mouse-position uniform.
    pub fn uniform(&self, viewport: Viewport) -> Vec2 {
        self.position
            .unwrap_or_else(|| Vec2::new(viewport.width as f32, viewport.height as f32))
    }

    /// Record a pointer move. Ignored while the viewport is empty.
    pub fn update_from_client(&mut self, client: Vec2, viewport: Viewport) {
        if let Some(position) = normalize_client(client, viewport) {
            self.position = Some(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn test_corners() {
        assert_eq!(
            normalize_client(Vec2::new(0.0, 0.0), VIEWPORT),
            Some(Vec2::new(-1.0, 1.0))
        );
        assert_eq!(
            normalize_client(Vec2::new(800.0, 600.0), VIEWPORT),
            Some(Vec2::new(1.0, -1.0))
        );
        assert_eq!(
            normalize_client(Vec2::new(400.0, 300.0), VIEWPORT),
            Some(Vec2::ZERO)
        );
    }

    #[test]
    fn test_outside_window_is_clamped() {
        let p = normalize_client(Vec2::new(-50.0, 900.0), VIEWPORT).unwrap();
        assert_eq!(p, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_empty_viewport_keeps_state() {
        let mut pointer = PointerState::new();
        pointer.update_from_client(Vec2::new(800.0, 0.0), VIEWPORT);
        assert_eq!(pointer.position(), Some(Vec2::new(1.0, 1.0)));

        pointer.update_from_client(Vec2::new(10.0, 10.0), Viewport::new(0, 600));
        assert_eq!(pointer.position(), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_untouched_pointer_is_off_screen() {
        let mut pointer = PointerState::new();
        assert_eq!(pointer.position(), None);
        assert_eq!(pointer.uniform(VIEWPORT), Vec2::new(800.0, 600.0));

        pointer.update_from_client(Vec2::new(400.0, 300.0), VIEWPORT);
        assert_eq!(pointer.uniform(VIEWPORT), Vec2::ZERO);
    }

    #[test]
    fn test_aspect() {
        assert!((VIEWPORT.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }
}
