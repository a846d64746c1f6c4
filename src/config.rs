use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the intro scene. Every section can be omitted from the
/// TOML file and falls back to the values below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reveal: RevealConfig,

    #[serde(default)]
    pub intro: IntroConfig,

    #[serde(default)]
    pub hover: HoverConfig,

    #[serde(default)]
    pub parallax: ParallaxConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub starfield: StarfieldConfig,

    #[serde(default)]
    pub flares: FlareConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// World units the splash sphere grows to at full progress.
    #[serde(default = "default_sweep_radius")]
    pub sweep_radius: f32,
    /// Soft edge of the solid mesh reveal.
    #[serde(default = "default_mesh_edge")]
    pub mesh_edge_width: f32,
    /// Soft edge of the wireframe overlay sweep.
    #[serde(default = "default_wire_edge")]
    pub wire_edge_width: f32,
    /// Fragments fainter than this are discarded.
    #[serde(default = "default_discard")]
    pub discard_threshold: f32,
    #[serde(default)]
    pub origin: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub delay_ms: f32,
    pub duration_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroConfig {
    #[serde(default = "default_wireframe_timeline")]
    pub wireframe: TimelineConfig,
    #[serde(default = "default_splash_timeline")]
    pub splash: TimelineConfig,
    /// Wireframe progress at which the intro counts as finished.
    #[serde(default = "default_finish_threshold")]
    pub finish_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverConfig {
    /// Clip whose playback speed follows the hover state.
    #[serde(default = "default_clip_name")]
    pub clip_name: String,
    #[serde(default = "default_forward_speed")]
    pub forward_speed: f32,
    #[serde(default = "default_reverse_speed")]
    pub reverse_speed: f32,
    /// Seconds to ease into reverse after the pointer enters the model.
    #[serde(default = "default_brake_duration")]
    pub brake_duration: f32,
    /// Seconds to ease back to cruise after the pointer leaves.
    #[serde(default = "default_accel_duration")]
    pub accel_duration: f32,
    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    #[serde(default = "default_yaw_amount")]
    pub yaw_amount: f32,
    #[serde(default = "default_pitch_amount")]
    pub pitch_amount: f32,
    #[serde(default = "default_offset_amount")]
    pub offset_amount: [f32; 2],
    /// Pointer magnitudes below this read as centred.
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,
    /// Viewports narrower than this (px) get a reduced effect.
    #[serde(default = "default_narrow_breakpoint")]
    pub narrow_breakpoint: f32,
    #[serde(default = "default_narrow_factor")]
    pub narrow_factor: f32,
    #[serde(default = "default_parallax_damping")]
    pub damping: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_base_distance")]
    pub base_distance: f32,
    /// Extra distance added at full scroll.
    #[serde(default = "default_scroll_zoom")]
    pub scroll_zoom: f32,
    #[serde(default = "default_camera_damping")]
    pub damping: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteBucket {
    pub weight: f32,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarfieldConfig {
    #[serde(default = "default_star_count")]
    pub count: usize,
    /// Outer radius of the star shell.
    #[serde(default = "default_star_radius")]
    pub radius: f32,
    /// Thickness of the shell; stars sit between `radius - depth` and `radius`.
    #[serde(default = "default_star_depth")]
    pub depth: f32,
    #[serde(default = "default_small_percent")]
    pub small_percent: usize,
    #[serde(default = "default_medium_percent")]
    pub medium_percent: usize,
    /// Sprite sizes for the small, medium and large tiers.
    #[serde(default = "default_tier_sizes")]
    pub tier_sizes: [f32; 3],
    #[serde(default = "default_min_brightness")]
    pub min_brightness: f32,
    /// Drift in rad/s around X and Y.
    #[serde(default = "default_drift")]
    pub drift: [f32; 2],
    #[serde(default = "default_palette")]
    pub palette: Vec<PaletteBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlareConfig {
    #[serde(default = "default_flare_count")]
    pub count: usize,
    #[serde(default = "default_flare_idle")]
    pub idle_range: [f32; 2],
    #[serde(default = "default_flare_active")]
    pub active_range: [f32; 2],
    #[serde(default = "default_flare_size")]
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_seconds")]
    pub seconds: f32,
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            intro: IntroConfig::default(),
            hover: HoverConfig::default(),
            parallax: ParallaxConfig::default(),
            camera: CameraConfig::default(),
            starfield: StarfieldConfig::default(),
            flares: FlareConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            sweep_radius: default_sweep_radius(),
            mesh_edge_width: default_mesh_edge(),
            wire_edge_width: default_wire_edge(),
            discard_threshold: default_discard(),
            origin: [0.0; 3],
        }
    }
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            wireframe: default_wireframe_timeline(),
            splash: default_splash_timeline(),
            finish_threshold: default_finish_threshold(),
        }
    }
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            clip_name: default_clip_name(),
            forward_speed: default_forward_speed(),
            reverse_speed: default_reverse_speed(),
            brake_duration: default_brake_duration(),
            accel_duration: default_accel_duration(),
            snap_epsilon: default_snap_epsilon(),
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            yaw_amount: default_yaw_amount(),
            pitch_amount: default_pitch_amount(),
            offset_amount: default_offset_amount(),
            deadzone: default_deadzone(),
            narrow_breakpoint: default_narrow_breakpoint(),
            narrow_factor: default_narrow_factor(),
            damping: default_parallax_damping(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_distance: default_base_distance(),
            scroll_zoom: default_scroll_zoom(),
            damping: default_camera_damping(),
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: default_star_count(),
            radius: default_star_radius(),
            depth: default_star_depth(),
            small_percent: default_small_percent(),
            medium_percent: default_medium_percent(),
            tier_sizes: default_tier_sizes(),
            min_brightness: default_min_brightness(),
            drift: default_drift(),
            palette: default_palette(),
        }
    }
}

impl Default for FlareConfig {
    fn default() -> Self {
        Self {
            count: default_flare_count(),
            idle_range: default_flare_idle(),
            active_range: default_flare_active(),
            size: default_flare_size(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            seconds: default_preview_seconds(),
            fps_cap: default_fps_cap(),
            seed: default_seed(),
        }
    }
}

fn default_sweep_radius() -> f32 {
    15.0
}

fn default_mesh_edge() -> f32 {
    2.0
}

fn default_wire_edge() -> f32 {
    3.0
}

fn default_discard() -> f32 {
    0.01
}

fn default_wireframe_timeline() -> TimelineConfig {
    TimelineConfig {
        delay_ms: 500.0,
        duration_secs: 6.0,
    }
}

fn default_splash_timeline() -> TimelineConfig {
    TimelineConfig {
        delay_ms: 2500.0,
        duration_secs: 3.5,
    }
}

fn default_finish_threshold() -> f32 {
    0.999
}

fn default_clip_name() -> String {
    "Orbit".to_string()
}

fn default_forward_speed() -> f32 {
    0.5
}

fn default_reverse_speed() -> f32 {
    -0.35
}

fn default_brake_duration() -> f32 {
    5.8
}

fn default_accel_duration() -> f32 {
    4.0
}

fn default_snap_epsilon() -> f32 {
    0.005
}

fn default_yaw_amount() -> f32 {
    0.05
}

fn default_pitch_amount() -> f32 {
    0.02
}

fn default_offset_amount() -> [f32; 2] {
    [0.3, 0.15]
}

fn default_deadzone() -> f32 {
    0.02
}

fn default_narrow_breakpoint() -> f32 {
    768.0
}

fn default_narrow_factor() -> f32 {
    0.5
}

fn default_parallax_damping() -> f32 {
    3.0
}

fn default_base_distance() -> f32 {
    10.0
}

fn default_scroll_zoom() -> f32 {
    10.0
}

fn default_camera_damping() -> f32 {
    3.0
}

fn default_star_count() -> usize {
    1200
}

fn default_star_radius() -> f32 {
    120.0
}

fn default_star_depth() -> f32 {
    40.0
}

fn default_small_percent() -> usize {
    70
}

fn default_medium_percent() -> usize {
    25
}

fn default_tier_sizes() -> [f32; 3] {
    [0.25, 0.5, 0.9]
}

fn default_min_brightness() -> f32 {
    0.8
}

fn default_drift() -> [f32; 2] {
    [0.005, 0.01]
}

fn bucket(weight: f32, colors: &[&str]) -> PaletteBucket {
    PaletteBucket {
        weight,
        colors: colors.iter().map(|c| c.to_string()).collect(),
    }
}

fn default_palette() -> Vec<PaletteBucket> {
    vec![
        bucket(0.45, &["#ffffff", "#f8f7ff", "#fdfbf5"]),
        bucket(0.25, &["#cad7ff", "#aabfff", "#dfe6ff"]),
        bucket(0.15, &["#fff4ea", "#ffe9c4", "#fff1d6"]),
        bucket(0.10, &["#ffd2a1", "#ffcc8f"]),
        bucket(0.05, &["#ffb38a", "#ff9e7a"]),
    ]
}

fn default_flare_count() -> usize {
    12
}

fn default_flare_idle() -> [f32; 2] {
    [2.0, 8.0]
}

fn default_flare_active() -> [f32; 2] {
    [0.6, 1.4]
}

fn default_flare_size() -> f32 {
    2.4
}

fn default_preview_seconds() -> f32 {
    12.0
}

fn default_fps_cap() -> u32 {
    60
}

fn default_seed() -> u64 {
    7
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("station-hero").join("config.toml");

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("station-hero");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}
