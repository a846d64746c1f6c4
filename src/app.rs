use crate::config::Config;
use crate::features::hover::HoverVelocity;
use crate::features::intro::Intro;
use crate::features::parallax::{CameraDolly, ParallaxRig, RigPose};
use crate::features::reveal::{line_reveal, LineSample, RevealField, RevealUniforms};
use crate::features::starfield::{Flares, Starfield};
use crate::features::{Feature, FrameContext};
use crate::gfx::clip::{find_clip, AnimationClip, ClipPlayer};
use crate::gfx::math::{Vec2, Vec3};
use crate::gfx::shader::UniformSink;
use crate::scene::{install_splash, remove_splash, Node};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Pointer position in window pixels.
    PointerMove { pos: Vec2 },
    /// Pointer started hovering the model.
    PointerEnter,
    PointerLeave,
    /// Page scroll offset in pixels.
    Scroll { top: f32 },
    Resize { width: f32, height: f32 },
}

/// Loaded assets the host hands over once its loader is done.
pub struct Assets {
    pub scene: Node,
    pub clips: Vec<AnimationClip>,
}

/// The intro scene driven by the host's frame callback.
pub struct App {
    pub config: Config,
    pub ctx: FrameContext,
    intro: Intro,
    rig: ParallaxRig,
    dolly: CameraDolly,
    mesh_field: RevealField,
    wire_field: RevealField,
    hover: Option<HoverVelocity>,
    player: Option<ClipPlayer>,
    starfield: Option<Starfield>,
    flares: Option<Flares>,
    scene: Option<Node>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let ctx = FrameContext {
            viewport: Vec2::new(1280.0, 720.0),
            wireframe_progress: -1.0,
            splash_progress: -1.0,
            ..FrameContext::default()
        };
        Self {
            intro: Intro::new(&config.intro),
            rig: ParallaxRig::new(&config.parallax),
            dolly: CameraDolly::new(&config.camera),
            mesh_field: RevealField::mesh_splash(&config.reveal),
            wire_field: RevealField::wireframe_splash(&config.reveal),
            hover: None,
            player: None,
            starfield: None,
            flares: None,
            scene: None,
            ctx,
            config,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    /// Starts the intro once assets are available. `None` leaves the app
    /// idle until the loader succeeds.
    pub fn mount<R: Rng + ?Sized>(&mut self, assets: Option<Assets>, rng: &mut R) {
        let Some(Assets { mut scene, clips }) = assets else {
            debug!("Assets not ready, staying idle");
            return;
        };
        if self.is_mounted() {
            warn!("Scene already mounted, ignoring second mount");
            return;
        }

        self.ctx.glow_targets = install_splash(&mut scene, &self.mesh_field, &self.wire_field);
        self.scene = Some(scene);

        match find_clip(&clips, &self.config.hover.clip_name) {
            Some(clip) => {
                let hover = HoverVelocity::new(&self.config.hover);
                self.player = Some(ClipPlayer::new(clip.to_seamless_loop(), hover.speed()));
                self.ctx.playback_speed = hover.speed();
                self.hover = Some(hover);
            }
            None => warn!(
                "No clip named '{}' among {} clips, playback stays off",
                self.config.hover.clip_name,
                clips.len()
            ),
        }

        self.starfield = Some(Starfield::generate(&self.config.starfield, rng));
        self.flares = Some(Flares::new(
            &self.config.flares,
            &self.config.starfield,
            StdRng::seed_from_u64(rng.gen()),
        ));

        self.intro.mount(self.ctx.time);
        info!("Scene mounted at {:.2}s", self.ctx.time);
    }

    fn features(&mut self) -> Vec<&mut dyn Feature> {
        let mut features: Vec<&mut dyn Feature> = Vec::with_capacity(5);
        features.push(&mut self.intro);
        features.push(&mut self.rig);
        features.push(&mut self.dolly);
        if let Some(hover) = self.hover.as_mut() {
            features.push(hover);
        }
        if let Some(flares) = self.flares.as_mut() {
            features.push(flares);
        }
        features
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        if let UiEvent::Resize { width, height } = event {
            self.ctx.viewport = Vec2::new(width, height);
        }
        let ctx = self.ctx.clone();
        for feature in self.features() {
            if feature.handle_event(&event, &ctx) {
                debug!("{} handled {:?}", feature.name(), event);
            }
        }
    }

    /// Per-frame entry point; `dt` in seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.ctx.time += dt;
        self.ctx.dt = dt;

        let mut ctx = std::mem::take(&mut self.ctx);
        for feature in self.features() {
            feature.update(&mut ctx);
        }
        self.ctx = ctx;

        if let Some(player) = self.player.as_mut() {
            player.time_scale = self.ctx.playback_speed;
            player.advance(dt);
        }
    }

    /// Uniforms for the solid mesh splash this frame.
    pub fn mesh_uniforms(&self) -> RevealUniforms {
        self.mesh_field.uniforms(self.ctx.splash_progress, self.ctx.time, 1.0)
    }

    /// Uniforms for the wireframe overlay, faded out as the page scrolls.
    pub fn wire_uniforms(&self) -> RevealUniforms {
        self.wire_field
            .uniforms(self.ctx.wireframe_progress, self.ctx.time, 1.0 - self.ctx.scroll * 0.5)
    }

    /// Top-down texture sweep at vertical UV `uv_y`, spread over the whole
    /// splash ramp.
    pub fn surface_reveal(&self, uv_y: f32) -> LineSample {
        line_reveal((self.ctx.splash_progress + 1.0) * 0.5, uv_y, self.ctx.time)
    }

    pub fn write_uniforms(&self, mesh: &mut dyn UniformSink, wire: &mut dyn UniformSink) {
        self.mesh_uniforms().write(mesh);
        if !self.ctx.intro_finished {
            self.wire_uniforms().write(wire);
        }
    }

    pub fn rig_pose(&self) -> RigPose {
        self.rig.pose()
    }

    pub fn camera_distance(&self) -> f32 {
        self.dolly.distance()
    }

    pub fn playback(&self) -> Option<&ClipPlayer> {
        self.player.as_ref()
    }

    pub fn hover(&self) -> Option<&HoverVelocity> {
        self.hover.as_ref()
    }

    pub fn intro(&self) -> &Intro {
        &self.intro
    }

    pub fn starfield(&self) -> Option<&Starfield> {
        self.starfield.as_ref()
    }

    pub fn starfield_rotation(&self) -> Vec3 {
        self.starfield
            .as_ref()
            .map(|field| field.rotation(self.ctx.time))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn flares(&self) -> Option<&Flares> {
        self.flares.as_ref()
    }

    pub fn scene(&self) -> Option<&Node> {
        self.scene.as_ref()
    }

    /// Cancels pending cues and releases everything created at mount.
    /// Returns the scene with its original materials restored.
    pub fn teardown(&mut self) -> Option<Node> {
        self.intro.teardown();
        self.intro = Intro::new(&self.config.intro);
        self.ctx.wireframe_progress = self.intro.wireframe.value();
        self.ctx.splash_progress = self.intro.splash.value();
        self.ctx.intro_finished = false;
        self.ctx.playback_speed = 0.0;
        self.hover = None;
        self.player = None;
        self.starfield = None;
        self.flares = None;
        self.ctx.glow_targets.clear();

        let mut scene = self.scene.take()?;
        remove_splash(&mut scene);
        info!("Scene torn down at {:.2}s", self.ctx.time);
        Some(scene)
    }
}
