//! Distance-based reveal fields behind the splash shaders.
//!
//! The GPU evaluates these per fragment from the uniforms produced here;
//! the CPU versions mirror the injected GLSL so the maths can be checked
//! without a GL context.

use crate::config::RevealConfig;
use crate::gfx::anim::smoothstep;
use crate::gfx::math::Vec3;
use crate::gfx::shader::{self, ShaderPatch, UniformSink, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealKind {
    /// Solid mesh grows in from hidden to fully shown.
    MeshSplash,
    /// Overlay sweeps in over progress [-1, 0] and back out over [0, 1].
    WireframeSplash,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealUniforms {
    pub progress: f32,
    pub origin: Vec3,
    pub time: f32,
    pub fade: f32,
}

impl RevealUniforms {
    pub fn write(&self, sink: &mut dyn UniformSink) {
        sink.set_uniform(shader::U_PROGRESS, UniformValue::Float(self.progress));
        sink.set_uniform(shader::U_ORIGIN, UniformValue::Vec3(self.origin));
        sink.set_uniform(shader::U_TIME, UniformValue::Float(self.time));
        sink.set_uniform(shader::U_FADE, UniformValue::Float(self.fade));
    }
}

#[derive(Debug, Clone)]
pub struct RevealField {
    pub kind: RevealKind,
    pub origin: Vec3,
    pub sweep_radius: f32,
    pub edge_width: f32,
    pub discard_below: f32,
}

impl RevealField {
    pub fn mesh_splash(cfg: &RevealConfig) -> Self {
        Self {
            kind: RevealKind::MeshSplash,
            origin: Vec3::from_array(cfg.origin),
            sweep_radius: cfg.sweep_radius,
            edge_width: cfg.mesh_edge_width,
            discard_below: cfg.discard_threshold,
        }
    }

    pub fn wireframe_splash(cfg: &RevealConfig) -> Self {
        Self {
            kind: RevealKind::WireframeSplash,
            origin: Vec3::from_array(cfg.origin),
            sweep_radius: cfg.sweep_radius,
            edge_width: cfg.wire_edge_width,
            discard_below: cfg.discard_threshold,
        }
    }

    /// Radius of the visible sphere at `progress`.
    pub fn radius(&self, progress: f32) -> f32 {
        match self.kind {
            RevealKind::MeshSplash => smoothstep(0.0, 1.0, progress) * self.sweep_radius,
            RevealKind::WireframeSplash => smoothstep(0.0, 1.0, progress + 1.0) * self.sweep_radius,
        }
    }

    /// Opacity of a point `distance` away from the origin, already multiplied
    /// by the edge ripple. Zero means the fragment is discarded.
    pub fn opacity(&self, progress: f32, distance: f32, time: f32) -> f32 {
        let e = self.edge_width;
        let r = self.radius(progress);
        let fade_in = 1.0 - smoothstep(r - e, r, distance);

        let alpha = match self.kind {
            RevealKind::MeshSplash => fade_in,
            RevealKind::WireframeSplash => {
                let r_out = smoothstep(0.0, 1.0, progress) * (self.sweep_radius + e);
                let fade_out = smoothstep(r_out - e, r_out, distance);
                fade_in.min(fade_out)
            }
        };

        let in_band = distance >= r - e && distance <= r;
        let alpha = if in_band { alpha * ripple(distance, time) } else { alpha };

        if alpha < self.discard_below {
            0.0
        } else {
            alpha
        }
    }

    pub fn uniforms(&self, progress: f32, time: f32, fade: f32) -> RevealUniforms {
        RevealUniforms {
            progress,
            origin: self.origin,
            time,
            fade,
        }
    }

    pub fn patch(&self) -> ShaderPatch {
        match self.kind {
            RevealKind::MeshSplash => shader::mesh_splash_patch(self.sweep_radius, self.edge_width, self.discard_below),
            RevealKind::WireframeSplash => {
                shader::wireframe_splash_patch(self.sweep_radius, self.edge_width, self.discard_below)
            }
        }
    }
}

/// Travelling wave at the reveal edge.
pub fn ripple(distance: f32, time: f32) -> f32 {
    0.5 + 0.5 * (2.0 * distance - 4.0 * time).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSample {
    /// 0 keeps the wireframe colour, 1 shows the surface colour.
    pub reveal: f32,
    pub edge_glow: f32,
}

/// Top-down texture sweep in UV space with a glow on the moving edge.
pub fn line_reveal(progress: f32, uv_y: f32, time: f32) -> LineSample {
    let progress = progress.clamp(0.0, 1.0);
    let line = 1.0 - progress;
    let dist = uv_y - line;
    let spread = (dist * 10.0 - time * 2.0).sin() * 0.1;
    LineSample {
        reveal: smoothstep(0.0, 0.3 + spread, dist),
        edge_glow: (-dist.abs() * 10.0).exp() * progress * (1.0 - progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> (RevealField, RevealField) {
        let cfg = RevealConfig::default();
        (RevealField::mesh_splash(&cfg), RevealField::wireframe_splash(&cfg))
    }

    #[test]
    fn mesh_splash_inside_and_outside() {
        let (mesh, _) = fields();
        // progress 0.5 -> radius 7.5
        assert_eq!(mesh.radius(0.5), 7.5);
        for t in [0.0, 0.3, 2.0] {
            assert_eq!(mesh.opacity(0.5, 1.0, t), 1.0);
            assert_eq!(mesh.opacity(0.5, 30.0, t), 0.0);
        }
    }

    #[test]
    fn mesh_splash_hidden_before_zero_and_shown_at_end() {
        let (mesh, _) = fields();
        assert_eq!(mesh.opacity(-1.0, 0.5, 0.0), 0.0);
        assert_eq!(mesh.opacity(0.0, 3.0, 0.0), 0.0);
        assert_eq!(mesh.opacity(1.0, 12.0, 0.0), 1.0);
    }

    #[test]
    fn edge_band_carries_the_ripple() {
        let (mesh, _) = fields();
        let d = 6.5;
        let plain = 1.0 - smoothstep(5.5, 7.5, d);
        let a = mesh.opacity(0.5, d, 0.0);
        assert!((a - plain * ripple(d, 0.0)).abs() < 1e-6 || a == 0.0);
    }

    #[test]
    fn wireframe_is_transient() {
        let (_, wire) = fields();
        assert_eq!(wire.opacity(-1.0, 2.0, 0.0), 0.0);
        // Fully swept in, not yet swept out.
        assert_eq!(wire.opacity(0.0, 5.0, 0.0), 1.0);
        // Gone everywhere at the end.
        for d in [0.0, 5.0, 14.0, 15.0, 16.0, 40.0] {
            assert_eq!(wire.opacity(1.0, d, 0.7), 0.0, "d={}", d);
        }
    }

    #[test]
    fn uniforms_reach_the_sink() {
        let (mesh, _) = fields();
        let mut sink: Vec<(String, UniformValue)> = Vec::new();
        mesh.uniforms(0.25, 3.0, 1.0).write(&mut sink);
        assert_eq!(sink.len(), 4);
        assert!(sink.contains(&(shader::U_PROGRESS.to_string(), UniformValue::Float(0.25))));
        assert!(sink.contains(&(shader::U_ORIGIN.to_string(), UniformValue::Vec3(Vec3::ZERO))));
    }

    #[test]
    fn line_reveal_glows_only_mid_sweep() {
        assert_eq!(line_reveal(0.0, 0.5, 0.0).edge_glow, 0.0);
        assert_eq!(line_reveal(1.0, 0.5, 0.0).edge_glow, 0.0);
        let mid = line_reveal(0.5, 0.5, 0.0);
        assert!((mid.edge_glow - 0.25).abs() < 1e-6);
        // Below the line stays wireframe.
        assert_eq!(line_reveal(0.5, 0.1, 0.0).reveal, 0.0);
        assert!(line_reveal(1.0, 0.9, 0.0).reveal > 0.99);
    }
}
