pub mod anim;
pub mod clip;
pub mod draw;
pub mod math;
pub mod shader;
