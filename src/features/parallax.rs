use crate::app::UiEvent;
use crate::config::{CameraConfig, ParallaxConfig};
use crate::features::{Feature, FrameContext};
use crate::gfx::anim::damp;
use crate::gfx::math::Vec2;

/// Window pixel coordinates to [-1, 1] with +y up.
pub fn normalize_pointer(px: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    let x = px.x / viewport.x * 2.0 - 1.0;
    let y = -(px.y / viewport.y) * 2.0 + 1.0;
    Vec2::new(x, y).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
}

/// Scrolled fraction of the first screen, in [0, 1].
pub fn scroll_progress(scroll_top: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return 0.0;
    }
    (scroll_top / viewport_height).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigPose {
    pub yaw: f32,
    pub pitch: f32,
    pub offset: Vec2,
}

pub struct ParallaxRig {
    cfg: ParallaxConfig,
    pointer: Vec2,
    target: RigPose,
    current: RigPose,
}

impl ParallaxRig {
    pub fn new(cfg: &ParallaxConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            pointer: Vec2::ZERO,
            target: RigPose::default(),
            current: RigPose::default(),
        }
    }

    pub fn pose(&self) -> RigPose {
        self.current
    }

    pub fn target(&self) -> RigPose {
        self.target
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Sets the pointer in normalized coordinates and recomputes the target.
    pub fn set_pointer(&mut self, ndc: Vec2, viewport_width: f32) {
        let deadzone = |v: f32| {
            let v = v.clamp(-1.0, 1.0);
            if v.abs() < self.cfg.deadzone {
                0.0
            } else {
                v
            }
        };
        self.pointer = Vec2::new(deadzone(ndc.x), deadzone(ndc.y));

        let scale = if viewport_width < self.cfg.narrow_breakpoint {
            self.cfg.narrow_factor
        } else {
            1.0
        };
        let [ox, oy] = self.cfg.offset_amount;
        self.target = RigPose {
            yaw: self.pointer.x * self.cfg.yaw_amount * scale,
            pitch: self.pointer.y * self.cfg.pitch_amount * scale,
            offset: Vec2::new(self.pointer.x * ox, self.pointer.y * oy) * scale,
        };
    }

    pub fn tick(&mut self, dt: f32) {
        let rate = self.cfg.damping;
        self.current = RigPose {
            yaw: damp(self.current.yaw, self.target.yaw, rate, dt),
            pitch: damp(self.current.pitch, self.target.pitch, rate, dt),
            offset: Vec2::new(
                damp(self.current.offset.x, self.target.offset.x, rate, dt),
                damp(self.current.offset.y, self.target.offset.y, rate, dt),
            ),
        };
    }
}

impl Feature for ParallaxRig {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn update(&mut self, ctx: &mut FrameContext) {
        self.tick(ctx.dt);
    }

    fn handle_event(&mut self, event: &UiEvent, ctx: &FrameContext) -> bool {
        match event {
            UiEvent::PointerMove { pos } => {
                self.set_pointer(normalize_pointer(*pos, ctx.viewport), ctx.viewport.x);
                true
            }
            UiEvent::Resize { width, .. } => {
                // Re-derive the target so the narrow-viewport factor applies.
                let pointer = self.pointer;
                self.set_pointer(pointer, *width);
                false
            }
            _ => false,
        }
    }
}

/// Pulls the camera back as the page scrolls.
pub struct CameraDolly {
    cfg: CameraConfig,
    scroll: f32,
    distance: f32,
}

impl CameraDolly {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            scroll: 0.0,
            distance: cfg.base_distance,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn target_distance(&self) -> f32 {
        self.cfg.base_distance + self.scroll * self.cfg.scroll_zoom
    }

    pub fn set_scroll(&mut self, progress: f32) {
        self.scroll = progress.clamp(0.0, 1.0);
    }

    pub fn tick(&mut self, dt: f32) {
        self.distance = damp(self.distance, self.target_distance(), self.cfg.damping, dt);
    }
}

impl Feature for CameraDolly {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn update(&mut self, ctx: &mut FrameContext) {
        self.tick(ctx.dt);
        ctx.scroll = self.scroll;
    }

    fn handle_event(&mut self, event: &UiEvent, ctx: &FrameContext) -> bool {
        match event {
            UiEvent::Scroll { top } => {
                self.set_scroll(scroll_progress(*top, ctx.viewport.y));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_normalisation() {
        let vp = Vec2::new(1000.0, 500.0);
        assert_eq!(normalize_pointer(Vec2::new(500.0, 250.0), vp), Vec2::ZERO);
        assert_eq!(normalize_pointer(Vec2::new(0.0, 0.0), vp), Vec2::new(-1.0, 1.0));
        assert_eq!(normalize_pointer(Vec2::new(1000.0, 500.0), vp), Vec2::new(1.0, -1.0));
        assert_eq!(normalize_pointer(Vec2::new(4000.0, -90.0), vp), Vec2::new(1.0, 1.0));
        assert_eq!(normalize_pointer(Vec2::new(1.0, 1.0), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn deadzone_and_narrow_scaling() {
        let cfg = ParallaxConfig::default();
        let mut rig = ParallaxRig::new(&cfg);

        rig.set_pointer(Vec2::new(0.01, -0.015), 1920.0);
        assert_eq!(rig.target(), RigPose::default());

        rig.set_pointer(Vec2::new(1.0, 1.0), 1920.0);
        let wide = rig.target();
        assert!((wide.yaw - cfg.yaw_amount).abs() < 1e-6);

        rig.set_pointer(Vec2::new(1.0, 1.0), 400.0);
        let narrow = rig.target();
        assert!((narrow.yaw - wide.yaw * cfg.narrow_factor).abs() < 1e-6);
        assert!((narrow.offset.x - wide.offset.x * cfg.narrow_factor).abs() < 1e-6);
    }

    #[test]
    fn rig_eases_without_snapping() {
        let mut rig = ParallaxRig::new(&ParallaxConfig::default());
        rig.set_pointer(Vec2::new(1.0, 0.0), 1920.0);
        let target = rig.target().yaw;

        rig.tick(1.0 / 60.0);
        let first = rig.pose().yaw;
        assert!(first > 0.0 && first < target);

        let mut last = first;
        for _ in 0..600 {
            rig.tick(1.0 / 60.0);
            assert!(rig.pose().yaw >= last && rig.pose().yaw <= target);
            last = rig.pose().yaw;
        }
        assert!((last - target).abs() < 1e-4);
    }

    #[test]
    fn scroll_pulls_the_camera_back() {
        assert_eq!(scroll_progress(250.0, 1000.0), 0.25);
        assert_eq!(scroll_progress(5000.0, 1000.0), 1.0);
        assert_eq!(scroll_progress(-20.0, 1000.0), 0.0);

        let mut dolly = CameraDolly::new(&CameraConfig::default());
        dolly.set_scroll(1.0);
        assert_eq!(dolly.target_distance(), 20.0);
        for _ in 0..900 {
            dolly.tick(1.0 / 60.0);
        }
        assert!((dolly.distance() - 20.0).abs() < 1e-3);
    }
}
