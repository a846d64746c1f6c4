use anyhow::Result;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use station_hero::app::{App, Assets, UiEvent};
use station_hero::config::Config;
use station_hero::gfx::clip::{AnimationClip, KeyframeTrack, TrackKind};
use station_hero::gfx::draw::{flare_vertices, star_vertices};
use station_hero::gfx::math::{Color, Quat, Vec2, Vec3};
use station_hero::gfx::shader::{UniformSink, UniformValue};
use station_hero::scene::{Group, Light, LightKind, Material, Mesh, Node};

/// Prints uniform writes instead of sending them to a GPU.
struct LogSink(&'static str);

impl UniformSink for LogSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        debug!("[{}] {} = {:?}", self.0, name, value);
    }
}

fn demo_station() -> Node {
    let hull = Material::standard("hull", Color::new(0.42, 0.44, 0.48));
    let panels = Material::standard("panels", Color::new(0.1, 0.12, 0.2))
        .with_emissive(Color::new(0.2, 0.6, 1.0), 1.5);
    let beacon = Material::standard("beacon", Color::WHITE).with_emissive(Color::new(1.0, 0.3, 0.2), 3.0);

    Node::Group(Group {
        name: "station".into(),
        children: vec![
            Node::Mesh(Mesh::new("core", hull.clone())),
            Node::Group(Group {
                name: "ring".into(),
                children: vec![
                    Node::Mesh(Mesh::new("ring_hull", hull)),
                    Node::Mesh(Mesh::new("solar_panels", panels)),
                    Node::Mesh(Mesh::new("beacon", beacon)),
                ],
            }),
            Node::Light(Light {
                name: "ambient".into(),
                kind: LightKind::Ambient,
                color: Color::WHITE,
                intensity: 0.5,
                position: Vec3::ZERO,
            }),
            Node::Light(Light {
                name: "sun".into(),
                kind: LightKind::Directional,
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(10.0, 10.0, 5.0),
            }),
        ],
    })
}

/// One slow revolution about Y, sampled with a little float drift at the end.
fn demo_orbit(name: &str) -> AnimationClip {
    let times: Vec<f32> = (0..=8).map(|i| i as f32 * 2.5).collect();
    let mut rotations = Vec::with_capacity(times.len() * 4);
    for (i, _) in times.iter().enumerate() {
        let angle = i as f32 / 8.0 * std::f32::consts::TAU + if i == 8 { 1e-4 } else { 0.0 };
        rotations.extend_from_slice(&Quat::from_rotation_y(angle).to_array());
    }
    let bob: Vec<f32> = times
        .iter()
        .flat_map(|t| [0.0, (t * 0.3).sin() * 0.2, 0.0])
        .collect();

    AnimationClip::new(
        name,
        vec![
            KeyframeTrack::quaternion("station.quaternion", times.clone(), rotations),
            KeyframeTrack::new("station.position", TrackKind::Vector, 3, times, bob),
        ],
    )
}

fn scripted_event(time: f32, viewport: Vec2) -> Option<UiEvent> {
    match (time * 10.0).round() as i32 {
        10 => Some(UiEvent::PointerMove {
            pos: Vec2::new(viewport.x * 0.8, viewport.y * 0.3),
        }),
        30 => Some(UiEvent::Scroll { top: viewport.y * 0.25 }),
        80 => Some(UiEvent::PointerEnter),
        100 => Some(UiEvent::PointerLeave),
        _ => None,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().unwrap_or_default();
    let fps = config.preview.fps_cap.max(1) as f32;
    let seconds = config.preview.seconds.max(0.0);
    let mut rng = StdRng::seed_from_u64(config.preview.seed);
    let clip_name = config.hover.clip_name.clone();

    let mut app = App::new(config);
    let viewport = Vec2::new(1440.0, 900.0);
    app.handle_event(UiEvent::Resize {
        width: viewport.x,
        height: viewport.y,
    });

    app.mount(
        Some(Assets {
            scene: demo_station(),
            clips: vec![demo_orbit(&clip_name)],
        }),
        &mut rng,
    );

    if let Some(field) = app.starfield() {
        let verts = star_vertices(field);
        info!(
            "Star buffer: {} points, {} bytes",
            verts.len(),
            bytemuck::cast_slice::<_, u8>(&verts).len()
        );
    }

    let dt = 1.0 / fps;
    let frames = (seconds * fps).round() as usize;
    let report_every = (fps / 2.0).round().max(1.0) as usize;
    let mut last_event_tick = -1;
    let mut mesh_sink = LogSink("mesh");
    let mut wire_sink = LogSink("wire");

    info!("Previewing {:.1}s at {} fps", seconds, fps);
    for frame in 0..frames {
        let tick = (app.ctx.time * 10.0).round() as i32;
        if tick != last_event_tick {
            last_event_tick = tick;
            if let Some(event) = scripted_event(app.ctx.time, viewport) {
                info!("t={:.2}s event {:?}", app.ctx.time, event);
                app.handle_event(event);
            }
        }

        app.update(dt);
        app.write_uniforms(&mut mesh_sink, &mut wire_sink);

        if frame % report_every == 0 {
            let pose = app.rig_pose();
            let lit = app
                .flares()
                .map(|f| flare_vertices(f.flares(), f.size(), Color::WHITE))
                .map(|v| v.iter().filter(|p| p.alpha > 0.0).count())
                .unwrap_or(0);
            info!(
                "t={:5.2}s wire={:+.3} splash={:+.3} done={} speed={:+.3} clip_t={:.2} yaw={:+.4} cam={:.2} sweep={:.2} flares_lit={}",
                app.ctx.time,
                app.ctx.wireframe_progress,
                app.ctx.splash_progress,
                app.ctx.intro_finished,
                app.ctx.playback_speed,
                app.playback().map(|p| p.time()).unwrap_or(0.0),
                pose.yaw,
                app.camera_distance(),
                app.surface_reveal(0.5).reveal,
                lit,
            );
        }
    }

    if let Some(scene) = app.teardown() {
        info!("Released scene '{}'", scene.name());
    }

    Ok(())
}
