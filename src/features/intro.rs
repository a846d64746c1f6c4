use crate::app::UiEvent;
use crate::config::{IntroConfig, TimelineConfig};
use crate::features::{Feature, FrameContext};
use crate::timers::Scheduler;
use log::{debug, info};

pub const PROGRESS_START: f32 = -1.0;
pub const PROGRESS_END: f32 = 1.0;

/// Linear ramp from -1 to 1 over `duration` seconds, started once by a
/// deferred cue. Never moves backwards and stays frozen at 1.
#[derive(Debug, Clone)]
pub struct ProgressTimeline {
    value: f32,
    is_animating: bool,
    start_delay: f32,
    duration: f32,
    elapsed: f32,
}

impl ProgressTimeline {
    pub fn new(start_delay: f32, duration: f32) -> Self {
        Self {
            value: PROGRESS_START,
            is_animating: false,
            start_delay,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn from_config(cfg: &TimelineConfig) -> Self {
        Self::new(cfg.delay_ms / 1000.0, cfg.duration_secs)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn start_delay(&self) -> f32 {
        self.start_delay
    }

    pub fn is_complete(&self) -> bool {
        self.value >= PROGRESS_END
    }

    /// Begins the ramp, crediting time already spent past the cue.
    pub fn start(&mut self, overshoot: f32) {
        if self.is_animating || self.is_complete() {
            return;
        }
        self.is_animating = true;
        self.step(overshoot.max(0.0));
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.is_animating || dt <= 0.0 {
            return;
        }
        self.step(dt);
    }

    fn step(&mut self, dt: f32) {
        self.elapsed += dt;
        let next = if self.duration > 0.0 {
            PROGRESS_START + (PROGRESS_END - PROGRESS_START) * self.elapsed / self.duration
        } else {
            PROGRESS_END
        };
        self.value = next.clamp(self.value, PROGRESS_END);
        if self.value >= PROGRESS_END {
            self.value = PROGRESS_END;
            self.is_animating = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroCue {
    StartWireframe,
    StartSplash,
}

/// Drives the wireframe and splash timelines from their start cues.
pub struct Intro {
    pub wireframe: ProgressTimeline,
    pub splash: ProgressTimeline,
    finish_threshold: f32,
    finished: bool,
    cues: Scheduler<IntroCue>,
}

impl Intro {
    pub fn new(cfg: &IntroConfig) -> Self {
        Self {
            wireframe: ProgressTimeline::from_config(&cfg.wireframe),
            splash: ProgressTimeline::from_config(&cfg.splash),
            finish_threshold: cfg.finish_threshold,
            finished: false,
            cues: Scheduler::new(),
        }
    }

    /// Queues both start cues relative to the mount time.
    pub fn mount(&mut self, now: f32) {
        self.cues.schedule(now + self.wireframe.start_delay(), IntroCue::StartWireframe);
        self.cues.schedule(now + self.splash.start_delay(), IntroCue::StartSplash);
        debug!(
            "Intro cues queued: wireframe at {:.2}s, splash at {:.2}s",
            now + self.wireframe.start_delay(),
            now + self.splash.start_delay()
        );
    }

    pub fn teardown(&mut self) {
        let cancelled = self.cues.cancel_all();
        if cancelled > 0 {
            info!("Cancelled {} pending intro cues", cancelled);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pending_cues(&self) -> usize {
        self.cues.len()
    }

    pub fn tick(&mut self, now: f32, dt: f32) {
        self.wireframe.advance(dt);
        self.splash.advance(dt);

        for (due, cue) in self.cues.drain_due(now) {
            let timeline = match cue {
                IntroCue::StartWireframe => &mut self.wireframe,
                IntroCue::StartSplash => &mut self.splash,
            };
            timeline.start(now - due);
            info!("{:?} fired at {:.2}s", cue, now);
        }

        if !self.finished && self.wireframe.value() >= self.finish_threshold {
            self.finished = true;
            info!("Intro finished at {:.2}s", now);
        }
    }
}

impl Feature for Intro {
    fn name(&self) -> &'static str {
        "intro"
    }

    fn update(&mut self, ctx: &mut FrameContext) {
        self.tick(ctx.time, ctx.dt);
        ctx.wireframe_progress = self.wireframe.value();
        ctx.splash_progress = self.splash.value();
        ctx.intro_finished = self.finished;
    }

    fn handle_event(&mut self, _event: &UiEvent, _ctx: &FrameContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intro(delay_ms: f32, duration_secs: f32) -> Intro {
        let timeline = TimelineConfig {
            delay_ms,
            duration_secs,
        };
        let mut intro = Intro::new(&IntroConfig {
            wireframe: timeline.clone(),
            splash: timeline,
            finish_threshold: 0.999,
        });
        intro.mount(0.0);
        intro
    }

    #[test]
    fn follows_delay_and_duration() {
        let mut intro = intro(2500.0, 3.5);
        let dt = 0.25;
        let mut now = 0.0;
        let mut at = |intro: &mut Intro, until: f32| {
            while now < until - 1e-6 {
                now += dt;
                intro.tick(now, dt);
            }
            intro.wireframe.value()
        };

        assert_eq!(at(&mut intro, 2.0), -1.0);
        assert!(!intro.wireframe.is_animating());
        assert!((at(&mut intro, 4.25) - 0.0).abs() < 1e-5);
        assert!(intro.wireframe.is_animating());
        assert_eq!(at(&mut intro, 6.0), 1.0);
        assert!(intro.is_finished());
        assert_eq!(at(&mut intro, 20.0), 1.0);
        assert!(!intro.wireframe.is_animating());
    }

    #[test]
    fn cue_between_ticks_is_credited() {
        let mut intro = intro(500.0, 2.0);
        intro.tick(0.4, 0.4);
        assert_eq!(intro.splash.value(), -1.0);
        intro.tick(0.8, 0.4);
        // 0.3s past the cue at 1 unit/s.
        assert!((intro.splash.value() - -0.7).abs() < 1e-5);
    }

    #[test]
    fn total_is_independent_of_tick_size() {
        for steps in [7usize, 60, 333] {
            let mut timeline = ProgressTimeline::new(0.0, 3.5);
            timeline.start(0.0);
            let dt = 3.5 / steps as f32;
            let mut last = timeline.value();
            for _ in 0..steps {
                timeline.advance(dt);
                assert!(timeline.value() >= last);
                assert!(timeline.value() <= PROGRESS_END);
                last = timeline.value();
            }
            assert!((timeline.value() - 1.0).abs() < 1e-3, "steps={}", steps);
        }
    }

    #[test]
    fn inert_until_started_and_frozen_after() {
        let mut timeline = ProgressTimeline::new(1.0, 1.0);
        timeline.advance(5.0);
        assert_eq!(timeline.value(), PROGRESS_START);

        timeline.start(0.0);
        timeline.advance(5.0);
        assert_eq!(timeline.value(), PROGRESS_END);
        timeline.start(0.0);
        timeline.advance(1.0);
        assert_eq!(timeline.value(), PROGRESS_END);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut timeline = ProgressTimeline::new(0.0, 0.0);
        timeline.start(0.01);
        assert!(timeline.is_complete());
    }

    #[test]
    fn zero_duration_completes_on_the_cue_tick() {
        let mut timeline = ProgressTimeline::new(0.0, 0.0);
        timeline.start(0.0);
        assert_eq!(timeline.value(), PROGRESS_END);
        assert!(!timeline.is_animating());

        // Cue landing exactly on a tick boundary.
        let mut intro = intro(500.0, 0.0);
        intro.tick(0.5, 0.5);
        assert_eq!(intro.wireframe.value(), PROGRESS_END);
        assert!(intro.is_finished());
    }

    #[test]
    fn teardown_cancels_cues() {
        let mut intro = intro(500.0, 1.0);
        assert_eq!(intro.pending_cues(), 2);
        intro.teardown();
        intro.tick(10.0, 10.0);
        assert_eq!(intro.wireframe.value(), PROGRESS_START);
        assert!(!intro.is_finished());
    }
}
