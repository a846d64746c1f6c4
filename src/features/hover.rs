use crate::app::UiEvent;
use crate::config::HoverConfig;
use crate::features::{Feature, FrameContext};
use crate::gfx::anim::{lerp, Easing};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    Cruising,
    Braking,
}

/// Eases the clip playback speed between forward cruise and reverse brake
/// as the pointer enters and leaves the model.
#[derive(Debug, Clone)]
pub struct HoverVelocity {
    phase: HoverPhase,
    progress: f32,
    from_speed: f32,
    to_speed: f32,
    speed: f32,
    duration: f32,
    easing: Easing,
    forward_speed: f32,
    reverse_speed: f32,
    brake_duration: f32,
    accel_duration: f32,
    snap_epsilon: f32,
}

impl HoverVelocity {
    pub fn new(cfg: &HoverConfig) -> Self {
        Self {
            phase: HoverPhase::Cruising,
            progress: 1.0,
            from_speed: cfg.forward_speed,
            to_speed: cfg.forward_speed,
            speed: cfg.forward_speed,
            duration: cfg.accel_duration,
            easing: Easing::InOutCubic,
            forward_speed: cfg.forward_speed,
            reverse_speed: cfg.reverse_speed,
            brake_duration: cfg.brake_duration,
            accel_duration: cfg.accel_duration,
            snap_epsilon: cfg.snap_epsilon,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_settled(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn hover_enter(&mut self) {
        self.retarget(HoverPhase::Braking, self.reverse_speed, self.brake_duration, Easing::OutExpo);
    }

    pub fn hover_leave(&mut self) {
        self.retarget(HoverPhase::Cruising, self.forward_speed, self.accel_duration, Easing::InOutCubic);
    }

    fn retarget(&mut self, phase: HoverPhase, to: f32, duration: f32, easing: Easing) {
        self.phase = phase;
        self.from_speed = self.speed;
        self.to_speed = to;
        self.duration = duration;
        self.easing = easing;
        self.progress = 0.0;
        debug!("Hover {:?}: {:.3} -> {:.3} over {:.1}s", phase, self.from_speed, to, duration);
    }

    pub fn tick(&mut self, dt: f32) {
        if self.progress >= 1.0 {
            self.speed = self.to_speed;
            return;
        }

        self.progress = if self.duration > 0.0 {
            (self.progress + dt / self.duration).min(1.0)
        } else {
            1.0
        };

        if self.progress >= 1.0 {
            self.speed = self.to_speed;
            return;
        }

        let speed = lerp(self.from_speed, self.to_speed, self.easing.apply(self.progress));
        self.speed = if speed.abs() < self.snap_epsilon { 0.0 } else { speed };
    }
}

impl Feature for HoverVelocity {
    fn name(&self) -> &'static str {
        "hover"
    }

    fn update(&mut self, ctx: &mut FrameContext) {
        self.tick(ctx.dt);
        ctx.playback_speed = self.speed;
    }

    fn handle_event(&mut self, event: &UiEvent, _ctx: &FrameContext) -> bool {
        match event {
            UiEvent::PointerEnter => {
                self.hover_enter();
                true
            }
            UiEvent::PointerLeave => {
                self.hover_leave();
                true
            }
            _ => false,
        }
    }
}
