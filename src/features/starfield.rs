use crate::app::UiEvent;
use crate::config::{FlareConfig, PaletteBucket, StarfieldConfig};
use crate::features::{Feature, FrameContext};
use crate::gfx::anim::triangle;
use crate::gfx::math::{Color, Vec3};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    fn index(self) -> usize {
        match self {
            SizeClass::Small => 0,
            SizeClass::Medium => 1,
            SizeClass::Large => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color: Color,
    pub size: SizeClass,
}

/// Small/medium/large counts for `count` stars. Large takes the remainder.
pub fn tier_counts(count: usize, small_percent: usize, medium_percent: usize) -> [usize; 3] {
    let small = count * small_percent.min(100) / 100;
    let medium = (count * medium_percent.min(100) / 100).min(count - small);
    [small, medium, count - small - medium]
}

/// Uniform point inside the spherical shell between `inner` and `outer`.
/// Negative or non-finite radii collapse to zero.
pub fn point_in_shell<R: Rng + ?Sized>(rng: &mut R, inner: f32, outer: f32) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    let dir = Vec3::new(ring * phi.cos(), ring * phi.sin(), z);

    let outer = finite_or_zero(outer).max(0.0);
    let inner = finite_or_zero(inner).clamp(0.0, outer);
    let (a, b) = (inner.powi(3), outer.powi(3));
    let r = if b > a && b.is_finite() {
        rng.gen_range(a..=b).cbrt()
    } else {
        outer
    };
    dir * r
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Weighted colour buckets, parsed once from the config strings.
#[derive(Debug, Clone)]
pub struct Palette {
    buckets: Vec<(f32, Vec<Color>)>,
    total: f32,
}

impl Palette {
    pub fn new(buckets: &[PaletteBucket]) -> Self {
        let buckets: Vec<(f32, Vec<Color>)> = buckets
            .iter()
            .filter(|b| b.weight.is_finite() && b.weight > 0.0)
            .map(|b| {
                let colors: Vec<Color> = b
                    .colors
                    .iter()
                    .filter_map(|hex| {
                        let color = Color::from_hex(hex);
                        if color.is_none() {
                            warn!("Ignoring invalid palette colour '{}'", hex);
                        }
                        color
                    })
                    .collect();
                (b.weight, colors)
            })
            .filter(|(_, colors)| !colors.is_empty())
            .collect();
        let total = buckets.iter().map(|(w, _)| w).sum();
        Self { buckets, total }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        if self.buckets.is_empty() || !(self.total > 0.0 && self.total.is_finite()) {
            return Color::WHITE;
        }
        let mut roll = rng.gen_range(0.0..self.total);
        for (weight, colors) in &self.buckets {
            if roll < *weight {
                return colors[rng.gen_range(0..colors.len())];
            }
            roll -= weight;
        }
        let colors = &self.buckets[self.buckets.len() - 1].1;
        colors[rng.gen_range(0..colors.len())]
    }
}

#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<Star>,
    pub tier_sizes: [f32; 3],
    drift: [f32; 2],
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(cfg: &StarfieldConfig, rng: &mut R) -> Self {
        let palette = Palette::new(&cfg.palette);
        let counts = tier_counts(cfg.count, cfg.small_percent, cfg.medium_percent);
        let inner = cfg.radius - cfg.depth;
        let min_brightness = finite_or_zero(cfg.min_brightness).clamp(0.0, 1.0);

        let mut stars = Vec::with_capacity(cfg.count);
        for size in SizeClass::ALL {
            for _ in 0..counts[size.index()] {
                let brightness = rng.gen_range(min_brightness..=1.0);
                stars.push(Star {
                    position: point_in_shell(rng, inner, cfg.radius),
                    color: palette.sample(rng).scaled(brightness),
                    size,
                });
            }
        }

        info!(
            "Generated {} stars ({} small, {} medium, {} large)",
            stars.len(),
            counts[0],
            counts[1],
            counts[2]
        );

        Self {
            stars,
            tier_sizes: cfg.tier_sizes,
            drift: cfg.drift,
        }
    }

    pub fn count(&self, size: SizeClass) -> usize {
        self.stars.iter().filter(|s| s.size == size).count()
    }

    pub fn sprite_size(&self, size: SizeClass) -> f32 {
        self.tier_sizes[size.index()]
    }

    /// Euler rotation (x, y, z) of the whole cloud at `time`.
    pub fn rotation(&self, time: f32) -> Vec3 {
        Vec3::new(time * self.drift[0], time * self.drift[1], 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlarePhase {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flare {
    pub position: Vec3,
    pub phase: FlarePhase,
    pub timer: f32,
    pub idle_duration: f32,
    pub active_duration: f32,
}

impl Flare {
    /// Pulse envelope: 0 while idle, rising and falling once while active.
    pub fn envelope(&self) -> f32 {
        match self.phase {
            FlarePhase::Idle => 0.0,
            FlarePhase::Active if self.active_duration > 0.0 => triangle(self.timer / self.active_duration),
            FlarePhase::Active => 0.0,
        }
    }
}

/// A fixed pool of pulsing sprites, recycled in place forever.
pub struct Flares {
    flares: Vec<Flare>,
    cfg: FlareConfig,
    inner: f32,
    outer: f32,
    rng: StdRng,
}

impl Flares {
    pub fn new(cfg: &FlareConfig, field: &StarfieldConfig, mut rng: StdRng) -> Self {
        let inner = field.radius - field.depth;
        let outer = field.radius;
        let flares = (0..cfg.count)
            .map(|_| {
                let mut flare = spawn(&mut rng, cfg, inner, outer);
                // Stagger the first cycle so the pool doesn't fire in unison.
                flare.timer = rng.gen_range(0.0..flare.idle_duration.max(f32::EPSILON));
                flare
            })
            .collect();
        Self {
            flares,
            cfg: cfg.clone(),
            inner,
            outer,
            rng,
        }
    }

    pub fn flares(&self) -> &[Flare] {
        &self.flares
    }

    pub fn size(&self) -> f32 {
        self.cfg.size
    }

    pub fn tick(&mut self, dt: f32) {
        for flare in &mut self.flares {
            flare.timer += dt;
            loop {
                match flare.phase {
                    FlarePhase::Idle if flare.timer >= flare.idle_duration => {
                        flare.timer -= flare.idle_duration;
                        flare.phase = FlarePhase::Active;
                    }
                    FlarePhase::Active if flare.timer >= flare.active_duration => {
                        *flare = spawn(&mut self.rng, &self.cfg, self.inner, self.outer);
                        break;
                    }
                    _ => break,
                }
            }
        }
    }
}

fn spawn(rng: &mut StdRng, cfg: &FlareConfig, inner: f32, outer: f32) -> Flare {
    Flare {
        position: point_in_shell(rng, inner, outer),
        phase: FlarePhase::Idle,
        timer: 0.0,
        idle_duration: sample_range(rng, cfg.idle_range),
        active_duration: sample_range(rng, cfg.active_range),
    }
}

fn sample_range(rng: &mut StdRng, [lo, hi]: [f32; 2]) -> f32 {
    let lo = finite_or_zero(lo).max(0.0);
    if hi.is_finite() && hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl Feature for Flares {
    fn name(&self) -> &'static str {
        "flares"
    }

    fn update(&mut self, ctx: &mut FrameContext) {
        self.tick(ctx.dt);
    }

    fn handle_event(&mut self, _event: &UiEvent, _ctx: &FrameContext) -> bool {
        false
    }
}
