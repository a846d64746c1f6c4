use crate::features::starfield::{Flare, Starfield};
use crate::gfx::math::Color;

/// Interleaved point-sprite vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
    pub alpha: f32,
}

pub const POINT_STRIDE: i32 = std::mem::size_of::<PointVertex>() as i32;

/// Attribute name, component count and byte offset for `PointVertex`.
pub const POINT_LAYOUT: [(&str, i32, i32); 4] = [
    ("aPos", 3, 0),
    ("aColor", 3, 12),
    ("aSize", 1, 24),
    ("aAlpha", 1, 28),
];

pub fn star_vertices(field: &Starfield) -> Vec<PointVertex> {
    field
        .stars
        .iter()
        .map(|star| PointVertex {
            pos: star.position.to_array(),
            color: star.color.to_array(),
            size: field.sprite_size(star.size),
            alpha: 1.0,
        })
        .collect()
}

/// Flares scale and fade with their pulse; idle ones are fully transparent.
pub fn flare_vertices(flares: &[Flare], size: f32, color: Color) -> Vec<PointVertex> {
    flares
        .iter()
        .map(|flare| {
            let env = flare.envelope();
            PointVertex {
                pos: flare.position.to_array(),
                color: color.to_array(),
                size: size * env,
                alpha: env,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StarfieldConfig;
    use crate::features::starfield::{FlarePhase, SizeClass};
    use crate::gfx::math::Vec3;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn layout_matches_struct() {
        assert_eq!(POINT_STRIDE, 32);
        let last = POINT_LAYOUT[3];
        assert_eq!(last.2 + last.1 * 4, POINT_STRIDE);
    }

    #[test]
    fn star_buffer_is_gpu_ready() {
        let cfg = StarfieldConfig {
            count: 20,
            ..StarfieldConfig::default()
        };
        let field = Starfield::generate(&cfg, &mut StdRng::seed_from_u64(5));
        let verts = star_vertices(&field);
        assert_eq!(verts.len(), 20);
        assert_eq!(bytemuck::cast_slice::<PointVertex, u8>(&verts).len(), 20 * 32);
        let large = field.stars.iter().position(|s| s.size == SizeClass::Large).unwrap();
        assert_eq!(verts[large].size, cfg.tier_sizes[2]);
    }

    #[test]
    fn idle_flares_are_invisible() {
        let mut flare = Flare {
            position: Vec3::X,
            phase: FlarePhase::Idle,
            timer: 0.3,
            idle_duration: 1.0,
            active_duration: 1.0,
        };
        let idle = flare_vertices(&[flare], 2.0, Color::WHITE);
        assert_eq!((idle[0].size, idle[0].alpha), (0.0, 0.0));

        flare.phase = FlarePhase::Active;
        flare.timer = 0.5;
        let peak = flare_vertices(&[flare], 2.0, Color::WHITE);
        assert_eq!((peak[0].size, peak[0].alpha), (2.0, 1.0));
    }
}
