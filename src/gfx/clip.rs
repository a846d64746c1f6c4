//! Keyframe clips, loop closing and playback.

use super::math::Quat;
use log::{debug, warn};

/// Timestamps closer than this are treated as equal.
pub const TIME_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Discrete,
    Linear,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Number,
    Vector,
    Quaternion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack {
    pub name: String,
    pub kind: TrackKind,
    pub times: Vec<f32>,
    /// Flat sample storage, `stride` components per keyframe.
    pub values: Vec<f32>,
    pub stride: usize,
    pub interpolation: Interpolation,
}

impl KeyframeTrack {
    pub fn new(name: impl Into<String>, kind: TrackKind, stride: usize, times: Vec<f32>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            kind,
            times,
            values,
            stride,
            interpolation: Interpolation::Linear,
        }
    }

    pub fn quaternion(name: impl Into<String>, times: Vec<f32>, values: Vec<f32>) -> Self {
        Self::new(name, TrackKind::Quaternion, 4, times, values)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Track is usable when it has samples and the value buffer matches the stride.
    pub fn is_valid(&self) -> bool {
        self.stride > 0 && !self.times.is_empty() && self.values.len() == self.times.len() * self.stride
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    pub fn sample_at(&self, index: usize) -> &[f32] {
        &self.values[index * self.stride..(index + 1) * self.stride]
    }

    fn is_rotation(&self) -> bool {
        self.kind == TrackKind::Quaternion && self.stride == 4
    }

    /// Interpolated value at `time`, clamped to the track's range.
    pub fn evaluate(&self, time: f32) -> Vec<f32> {
        if !self.is_valid() {
            return Vec::new();
        }
        let last = self.times.len() - 1;
        if time <= self.times[0] {
            return self.sample_at(0).to_vec();
        }
        if time >= self.times[last] {
            return self.sample_at(last).to_vec();
        }

        let upper = self.times.partition_point(|&t| t <= time).min(last);
        let lower = upper - 1;
        let span = self.times[upper] - self.times[lower];
        let t = if span > TIME_EPSILON { (time - self.times[lower]) / span } else { 0.0 };
        let a = self.sample_at(lower);
        let b = self.sample_at(upper);

        match self.interpolation {
            Interpolation::Discrete => a.to_vec(),
            _ if self.is_rotation() => {
                let qa = Quat::from_xyzw(a[0], a[1], a[2], a[3]);
                let qb = Quat::from_xyzw(b[0], b[1], b[2], b[3]);
                qa.slerp(qb, t).to_array().to_vec()
            }
            _ => a.iter().zip(b).map(|(x, y)| x + (y - x) * t).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Builds a clip whose duration is taken from its longest track.
    pub fn new(name: impl Into<String>, tracks: Vec<KeyframeTrack>) -> Self {
        let mut clip = Self {
            name: name.into(),
            duration: 0.0,
            tracks,
        };
        clip.reset_duration();
        clip
    }

    pub fn reset_duration(&mut self) {
        self.duration = self
            .tracks
            .iter()
            .map(KeyframeTrack::end_time)
            .fold(0.0, f32::max);
    }

    /// Returns a copy that repeats without a visible seam.
    ///
    /// Every track starts at exactly 0 and ends at the clip duration with a
    /// sample identical to its first one. Rotation tracks get their end
    /// quaternion flipped onto the start's hemisphere, and all tracks are
    /// switched to linear interpolation.
    pub fn to_seamless_loop(&self) -> AnimationClip {
        let mut clip = self.clone();
        let duration = clip
            .tracks
            .iter()
            .map(KeyframeTrack::end_time)
            .fold(clip.duration, f32::max);

        for track in &mut clip.tracks {
            if !track.is_valid() {
                warn!("Skipping malformed track '{}' in clip '{}'", track.name, clip.name);
                continue;
            }
            close_loop(track, duration);
        }

        clip.reset_duration();
        debug!("Normalised clip '{}' to {:.3}s loop", clip.name, clip.duration);
        clip
    }
}

fn close_loop(track: &mut KeyframeTrack, duration: f32) {
    let stride = track.stride;

    if track.times[0].abs() < TIME_EPSILON {
        track.times[0] = 0.0;
    } else if track.times[0] > 0.0 {
        let first = track.sample_at(0).to_vec();
        track.times.insert(0, 0.0);
        track.values.splice(0..0, first).for_each(drop);
    }

    let first = track.sample_at(0).to_vec();
    let last = track.times.len() - 1;

    if last > 0 && (track.times[last] - duration).abs() < TIME_EPSILON {
        track.times[last] = duration;
        track.values[last * stride..].copy_from_slice(&first);
    } else {
        track.times.push(duration);
        track.values.extend_from_slice(&first);
    }

    if track.is_rotation() {
        let end = track.times.len() - 1;
        let start = track.sample_at(0);
        let dot: f32 = start.iter().zip(track.sample_at(end)).map(|(a, b)| a * b).sum();
        if dot < 0.0 {
            for v in &mut track.values[end * stride..] {
                *v = -*v;
            }
        }
    }

    track.interpolation = Interpolation::Linear;
}

pub fn find_clip<'a>(clips: &'a [AnimationClip], name: &str) -> Option<&'a AnimationClip> {
    clips.iter().find(|clip| clip.name == name)
}

/// Plays a clip on repeat at a signed speed.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clip: AnimationClip,
    time: f32,
    pub time_scale: f32,
}

impl ClipPlayer {
    pub fn new(clip: AnimationClip, time_scale: f32) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance(&mut self, dt: f32) {
        if self.clip.duration <= TIME_EPSILON {
            return;
        }
        self.time = (self.time + dt * self.time_scale).rem_euclid(self.clip.duration);
    }

    /// Current value of every track, keyed by track name.
    pub fn sample(&self) -> Vec<(&str, Vec<f32>)> {
        self.clip
            .tracks
            .iter()
            .filter(|track| track.is_valid())
            .map(|track| (track.name.as_str(), track.evaluate(self.time)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin_clip() -> AnimationClip {
        // Quarter turns about Y, ending on the far hemisphere.
        let h = std::f32::consts::FRAC_1_SQRT_2;
        AnimationClip {
            name: "Orbit".into(),
            duration: 4.0,
            tracks: vec![
                KeyframeTrack::new(
                    "station.position",
                    TrackKind::Vector,
                    3,
                    vec![0.0000004, 1.0, 2.5],
                    vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.1, 0.2, 0.3],
                ),
                KeyframeTrack::quaternion(
                    "station.quaternion",
                    vec![0.0, 2.0, 4.0 - 1e-7],
                    vec![0.0, 0.0, 0.0, 1.0, 0.0, h, 0.0, h, 0.0, -0.99, 0.0, -0.1],
                ),
            ],
        }
    }

    #[test]
    fn closes_every_track() {
        let input = spin_clip();
        let looped = input.to_seamless_loop();

        for track in &looped.tracks {
            assert_eq!(track.times[0], 0.0, "{}", track.name);
            let end = track.len() - 1;
            for (a, b) in track.sample_at(0).iter().zip(track.sample_at(end)) {
                assert!((a - b).abs() < 1e-6, "{}", track.name);
            }
            assert_eq!(track.interpolation, Interpolation::Linear);
        }
        assert_eq!(looped.duration, 4.0);
        assert_eq!(looped.tracks[0].len(), 4);
        assert_eq!(looped.tracks[0].end_time(), looped.duration);
        // Input left untouched.
        assert_eq!(input, spin_clip());
    }

    #[test]
    fn overwrites_end_sample_that_drifted() {
        let looped = spin_clip().to_seamless_loop();
        let rot = &looped.tracks[1];
        assert_eq!(rot.len(), 3);
        assert_eq!(rot.end_time(), 4.0);
        assert_eq!(rot.sample_at(2), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn seam_rotates_the_short_way() {
        // 300 degrees about Y, so the last segment back to identity is a
        // 60 degree turn that starts on the far hemisphere.
        let far = Quat::from_rotation_y(300f32.to_radians());
        let mut values = Quat::IDENTITY.to_array().to_vec();
        values.extend_from_slice(&far.to_array());
        values.extend_from_slice(&[0.0, 0.001, 0.0, 1.0]);
        let clip = AnimationClip::new(
            "Turn",
            vec![KeyframeTrack::quaternion("station.quaternion", vec![0.0, 1.0, 2.0], values)],
        );

        let looped = clip.to_seamless_loop();
        let rot = &looped.tracks[0];
        assert_eq!(rot.len(), 3);
        let start = Quat::from_slice(rot.sample_at(0));
        let end = Quat::from_slice(rot.sample_at(2));
        assert!(start.dot(end) >= 0.0);
        assert_eq!(end, Quat::IDENTITY);
        // The closing segment starts on the far hemisphere.
        assert!(far.dot(end) < 0.0);

        let at = |t: f32| Quat::from_slice(&rot.evaluate(t));
        // Halfway through the closing segment: 30 degrees off, not 150.
        assert!(at(1.5).angle_between(Quat::IDENTITY) < 0.6);
        // Both sides of the wrap land on the same orientation.
        assert!(at(2.0 - 1e-3).angle_between(at(0.0)) < 0.01);
        assert!(at(1e-3).angle_between(at(0.0)) < 0.01);
    }

    #[test]
    fn late_first_key_gets_a_zero_key() {
        let clip = AnimationClip::new(
            "Blink",
            vec![KeyframeTrack::new("light.intensity", TrackKind::Number, 1, vec![0.5, 1.0], vec![2.0, 4.0])],
        );
        let looped = clip.to_seamless_loop();
        let track = &looped.tracks[0];
        assert_eq!(track.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(track.values, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn malformed_tracks_are_left_alone() {
        let mut clip = spin_clip();
        clip.tracks.push(KeyframeTrack::new("broken", TrackKind::Vector, 3, vec![0.0, 1.0], vec![1.0]));
        let looped = clip.to_seamless_loop();
        assert_eq!(looped.tracks[2].values, vec![1.0]);
    }

    #[test]
    fn evaluate_interpolates_between_keys() {
        let track = KeyframeTrack::new("x", TrackKind::Number, 1, vec![0.0, 2.0], vec![0.0, 4.0]);
        assert_eq!(track.evaluate(1.0), vec![2.0]);
        assert_eq!(track.evaluate(-1.0), vec![0.0]);
        assert_eq!(track.evaluate(9.0), vec![4.0]);
    }

    #[test]
    fn player_wraps_in_both_directions() {
        let clip = spin_clip().to_seamless_loop();
        let mut player = ClipPlayer::new(clip, 0.5);
        player.advance(10.0);
        assert!((player.time() - 1.0).abs() < 1e-5);

        player.time_scale = -0.35;
        player.advance(10.0);
        assert!((player.time() - 1.5).abs() < 1e-4);
        assert!(player.time() >= 0.0 && player.time() < 4.0);
        assert_eq!(player.sample().len(), 2);
    }

    #[test]
    fn find_clip_by_name() {
        let clips = vec![spin_clip()];
        assert!(find_clip(&clips, "Orbit").is_some());
        assert!(find_clip(&clips, "Missing").is_none());
    }
}
