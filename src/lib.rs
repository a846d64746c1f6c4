//! Animation core for the space station hero scene: intro reveal timelines,
//! splash shader fields, hover-driven clip playback, pointer parallax and a
//! procedural starfield. Rendering is left to the host, which calls
//! [`app::App::update`] once per frame and reads the resulting uniforms and
//! transforms.

pub mod app;
pub mod config;
pub mod features;
pub mod gfx;
pub mod scene;
pub mod timers;
