pub mod hover;
pub mod intro;
pub mod parallax;
pub mod reveal;
pub mod starfield;

use crate::app::UiEvent;
use crate::gfx::math::Vec2;

/// State shared between features for one frame. Each field has a single
/// writer: the intro owns the progress values, the hover controller owns
/// `playback_speed`, the camera dolly owns `scroll`, and scene preparation
/// owns `glow_targets`.
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    pub time: f32,
    pub dt: f32,
    pub viewport: Vec2,
    pub wireframe_progress: f32,
    pub splash_progress: f32,
    pub intro_finished: bool,
    pub playback_speed: f32,
    pub scroll: f32,
    pub glow_targets: Vec<String>,
}

pub trait Feature {
    fn name(&self) -> &'static str;
    fn update(&mut self, ctx: &mut FrameContext);
    fn handle_event(&mut self, event: &UiEvent, ctx: &FrameContext) -> bool;
}
