//! Strafe Trail: keep the crosshair on one strafing target
//!
//! The target drifts toward a desired velocity that is re-rolled on a short
//! random timer, and bounces off the wall edges. Scoring is continuous:
//! shots are generated on a fixed cadence rather than by clicks.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{ModeContext, ModeEngine, ModeId};
use crate::settings::{Settings, TargetShape, TrackInputMode};
use crate::sim::metrics::{Metrics, ModeStats, Segment, Summary, SummaryDetails};
use crate::sim::shape;
use crate::sim::target::{SpawnArea, Target, TargetRegistry, Wall};
use crate::{format_pct, mean, ratio01};

/// Gap kept between the moving target and the wall border
const MOTION_PADDING: f32 = 0.2;
/// The target slides just in front of the wall
const WALL_OFFSET: f32 = 0.02;

/// Passive mode awards one hit per this much on-target time (seconds)
pub const PASSIVE_HIT_INTERVAL: f64 = 0.1;
/// Hold mode fire rate (shots per second)
pub const HOLD_FIRE_RATE: f64 = 12.0;
/// Absorbs float drift so exact multiples of the interval still tick
const TICK_EPSILON: f64 = 1e-9;

/// Velocity smoothing rate (1/s)
const STEER_RATE: f32 = 7.5;
/// Vertical share of the launch velocity
const LAUNCH_VERTICAL: f32 = 0.65;
/// Vertical share of a re-rolled desired velocity
const TURN_VERTICAL: f32 = 0.35;

/// Target speed for a motion-speed setting
pub fn base_speed(motion_speed: f32) -> f32 {
    2.6 + 2.2 * motion_speed.clamp(0.4, 4.0)
}

/// Continuous-tracking bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackStats {
    pub shots: u32,
    pub hits: u32,
    /// Seconds spent engaged
    pub on_target_time: f64,
    /// Loss-to-reacquire latencies (ms)
    pub reacquire_times: Vec<f64>,
    /// Closed engaged intervals
    pub segments: Vec<Segment>,
    /// Start of the engaged interval in progress
    open_segment: Option<f64>,
    was_on_target: bool,
    /// Clock time the aim last slid off the target (ms)
    lost_at_ms: Option<f64>,
}

impl TrackStats {
    pub fn reacquire_count(&self) -> u32 {
        self.reacquire_times.len() as u32
    }

    /// Open or close the engaged segment at session time `t`
    fn track_engagement(&mut self, engaged: bool, t: f64) {
        match (engaged, self.open_segment) {
            (true, None) => self.open_segment = Some(t),
            (false, Some(_)) => self.close_segment(t),
            _ => {}
        }
    }

    /// Close the open segment, if any
    fn close_segment(&mut self, t: f64) {
        if let Some(start) = self.open_segment.take() {
            self.segments.push(Segment {
                start,
                end: t.max(start),
            });
        }
    }

    /// Follow the raw on-target signal for reacquire timing
    fn track_reacquire(&mut self, on_target: bool, now_ms: f64) {
        if self.was_on_target && !on_target {
            self.lost_at_ms = Some(now_ms);
        } else if !self.was_on_target && on_target {
            if let Some(lost_at) = self.lost_at_ms.take() {
                let latency = now_ms - lost_at;
                if latency.is_finite() && latency >= 0.0 {
                    self.reacquire_times.push(latency);
                }
            }
        }
        self.was_on_target = on_target;
    }

    pub fn accuracy01(&self, elapsed: f64) -> f64 {
        ratio01(self.on_target_time, elapsed)
    }
}

pub struct TrackMode {
    rng: Pcg32,
    wall: Wall,
    shape: TargetShape,
    size: f32,
    motion_speed: f32,
    input_mode: TrackInputMode,
    registry: TargetRegistry,
    vel: Vec2,
    desired_vel: Vec2,
    /// Seconds until the next direction change
    turn_timer: f64,
    firing: bool,
    fire_accum: f64,
    stats: TrackStats,
}

impl TrackMode {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wall: Wall::default(),
            shape: TargetShape::default(),
            size: 1.0,
            motion_speed: 1.5,
            input_mode: TrackInputMode::default(),
            registry: TargetRegistry::new(),
            vel: Vec2::ZERO,
            desired_vel: Vec2::ZERO,
            turn_timer: 0.0,
            firing: false,
            fire_accum: 0.0,
            stats: TrackStats::default(),
        }
    }

    pub fn stats(&self) -> &TrackStats {
        &self.stats
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Where the target center may travel
    pub fn motion_area(&self) -> SpawnArea {
        let bounds = shape::bounds_for(self.shape, self.size);
        self.wall.spawn_area(self.shape, &bounds, MOTION_PADDING)
    }

    fn signed_unit(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }

    /// Spawn the target near the wall center with a random launch velocity
    fn launch(&mut self, now_ms: f64) {
        let area = self.motion_area();
        let center_y = self.wall.center_y;
        let x = self.signed_unit() * area.max_x * 0.5;
        let y = (center_y + self.signed_unit() * (area.max_y - center_y) * 0.5).max(area.min_y);
        let pos = Vec3::new(x, y, self.wall.z + WALL_OFFSET);

        self.registry.clear();
        let id = self.registry.spawn(self.shape, self.size, pos, now_ms);

        let speed = base_speed(self.motion_speed);
        let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
        self.vel = Vec2::new(angle.cos() * speed, angle.sin() * speed * LAUNCH_VERTICAL);
        self.desired_vel = self.vel;
        self.turn_timer = 0.65 + self.rng.random::<f64>() * 0.85;
        log::debug!("Track target {:?} launched at ({:.2}, {:.2})", id, x, y);
    }

    /// Pick a new desired velocity and restart the turn timer
    fn reroll_direction(&mut self) {
        let speed = base_speed(self.motion_speed);
        let dir = if self.rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 };
        let vx = dir * speed * (0.85 + self.rng.random::<f32>() * 0.35);
        let vy = self.signed_unit() * speed * TURN_VERTICAL;
        self.desired_vel = Vec2::new(vx, vy);
        self.turn_timer = 0.55 + self.rng.random::<f64>() * 0.95;
    }

    /// Advance the target by `dt` seconds
    fn step_motion(&mut self, dt: f64) {
        self.turn_timer -= dt;
        if self.turn_timer <= 0.0 {
            self.reroll_direction();
        }

        let dt = dt as f32;
        self.vel = self.vel.lerp(self.desired_vel, 1.0 - (-STEER_RATE * dt).exp());

        let area = self.motion_area();
        let z = self.wall.z + WALL_OFFSET;
        let Some(target) = self.registry.first_mut() else {
            return;
        };
        let mut pos = target.pos + (self.vel * dt).extend(0.0);
        pos.z = z;

        if pos.x < area.min_x {
            pos.x = area.min_x;
            self.vel.x = self.vel.x.abs();
            self.desired_vel.x = self.desired_vel.x.abs();
        }
        if pos.x > area.max_x {
            pos.x = area.max_x;
            self.vel.x = -self.vel.x.abs();
            self.desired_vel.x = -self.desired_vel.x.abs();
        }
        if pos.y < area.min_y {
            pos.y = area.min_y;
            self.vel.y = self.vel.y.abs();
            self.desired_vel.y = self.desired_vel.y.abs();
        }
        if pos.y > area.max_y {
            pos.y = area.max_y;
            self.vel.y = -self.vel.y.abs();
            self.desired_vel.y = -self.desired_vel.y.abs();
        }
        target.pos = pos;
    }

    /// Generate the shots due after `dt` seconds of scoring time
    fn score(&mut self, ctx: &mut ModeContext<'_>, on_target: bool, dt: f64) {
        let (active, interval) = match self.input_mode {
            TrackInputMode::Passive => (on_target, PASSIVE_HIT_INTERVAL),
            TrackInputMode::Hold => (self.firing, 1.0 / HOLD_FIRE_RATE),
        };
        if !active {
            self.fire_accum = 0.0;
            return;
        }

        let target = self.registry.as_slice().first().map(|t| t.id);
        self.fire_accum += dt;
        while self.fire_accum + TICK_EPSILON >= interval {
            self.fire_accum -= interval;
            self.stats.shots += 1;
            if on_target {
                self.stats.hits += 1;
                ctx.target_hit(target);
            }
        }
        self.fire_accum = self.fire_accum.max(0.0);
    }
}

impl ModeEngine for TrackMode {
    fn id(&self) -> ModeId {
        ModeId::Track
    }

    fn start(&mut self, settings: &Settings, now_ms: f64) {
        self.shape = settings.target_shape;
        self.size = settings.target_size;
        self.motion_speed = settings.motion_speed;
        self.input_mode = settings.track_input_mode;
        self.stats = TrackStats::default();
        self.firing = false;
        self.fire_accum = 0.0;
        self.launch(now_ms);
    }

    fn update(&mut self, ctx: &mut ModeContext<'_>, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.step_motion(dt);

        let on_target = ctx.pick(self.registry.as_slice()).is_some();
        let engaged = match self.input_mode {
            TrackInputMode::Passive => on_target,
            TrackInputMode::Hold => self.firing && on_target,
        };
        if engaged {
            self.stats.on_target_time += dt;
        }
        self.stats.track_engagement(engaged, ctx.session_time());
        self.stats.track_reacquire(on_target, ctx.now_ms);

        self.score(ctx, on_target, dt);
    }

    fn on_pointer_down(&mut self, _ctx: &mut ModeContext<'_>) {
        self.firing = true;
    }

    fn on_pointer_up(&mut self, _ctx: &mut ModeContext<'_>) {
        self.firing = false;
    }

    fn pause(&mut self) {
        self.firing = false;
        self.fire_accum = 0.0;
    }

    fn metrics(&self, elapsed: f64) -> Metrics {
        let accuracy01 = self.stats.accuracy01(elapsed);
        Metrics {
            accuracy01,
            avg_response_ms: mean(&self.stats.reacquire_times),
            extra_label: "On target".to_string(),
            extra_value: format_pct(accuracy01),
        }
    }

    fn summary(&mut self, elapsed: f64, settings: &Settings) -> Summary {
        self.stats.close_segment(elapsed);
        let accuracy01 = self.stats.accuracy01(elapsed);
        Summary {
            mode_id: ModeId::Track,
            mode_name: ModeId::Track.name().to_string(),
            elapsed,
            settings: settings.clone(),
            shots: self.stats.shots,
            hits: self.stats.hits,
            accuracy01,
            avg_response_ms: mean(&self.stats.reacquire_times),
            stats: ModeStats::Tracking {
                on_target01: accuracy01,
                reacquire_count: self.stats.reacquire_count(),
            },
            details: Some(SummaryDetails::Tracking {
                segments: self.stats.segments.clone(),
                reacquire_times: self.stats.reacquire_times.clone(),
            }),
        }
    }

    fn targets(&self) -> &[Target] {
        self.registry.as_slice()
    }

    fn dispose(&mut self) {
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::modes::test_support::{ScriptedRaycaster, context};
    use crate::sim::session::GameEvent;
    use proptest::prelude::*;

    const DT: f64 = 1.0 / 60.0;

    fn started(input: TrackInputMode) -> TrackMode {
        let settings = Settings {
            track_input_mode: input,
            ..Settings::default()
        };
        let mut mode = TrackMode::new(11);
        mode.start(&settings, 0.0);
        mode
    }

    /// Run `frames` ticks starting at frame `from`
    fn run(
        mode: &mut TrackMode,
        ray: &ScriptedRaycaster,
        events: &mut Vec<GameEvent>,
        from: usize,
        frames: usize,
    ) {
        for frame in from..from + frames {
            let now = (frame + 1) as f64 * DT * 1000.0;
            mode.update(&mut context(now, ray, events), DT);
        }
    }

    #[test]
    fn test_passive_one_second_on_target() {
        let mut mode = started(TrackInputMode::Passive);
        let ray = ScriptedRaycaster::default();
        ray.on_target.set(true);
        let mut events = Vec::new();
        run(&mut mode, &ray, &mut events, 0, 60);

        assert_eq!(mode.stats().shots, 10);
        assert_eq!(mode.stats().hits, 10);
        assert_eq!(events.len(), 10);
        assert!((mode.stats().accuracy01(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_passive_off_target_scores_nothing() {
        let mut mode = started(TrackInputMode::Passive);
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();
        run(&mut mode, &ray, &mut events, 0, 60);
        assert_eq!(mode.stats().shots, 0);
        assert_eq!(mode.stats().on_target_time, 0.0);
    }

    #[test]
    fn test_hold_fires_twelve_per_second() {
        let mut mode = started(TrackInputMode::Hold);
        let ray = ScriptedRaycaster::default();
        ray.on_target.set(true);
        let mut events = Vec::new();
        mode.on_pointer_down(&mut context(0.0, &ray, &mut events));
        run(&mut mode, &ray, &mut events, 0, 60);

        assert_eq!(mode.stats().shots, 12);
        assert_eq!(mode.stats().hits, 12);
    }

    #[test]
    fn test_hold_off_target_misses_every_shot() {
        let mut mode = started(TrackInputMode::Hold);
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();
        mode.on_pointer_down(&mut context(0.0, &ray, &mut events));
        run(&mut mode, &ray, &mut events, 0, 60);

        assert_eq!(mode.stats().shots, 12);
        assert_eq!(mode.stats().hits, 0);
        assert!(events.is_empty());
        assert_eq!(mode.stats().on_target_time, 0.0);
    }

    #[test]
    fn test_hold_without_fire_is_not_engaged() {
        let mut mode = started(TrackInputMode::Hold);
        let ray = ScriptedRaycaster::default();
        ray.on_target.set(true);
        let mut events = Vec::new();
        run(&mut mode, &ray, &mut events, 0, 30);

        assert_eq!(mode.stats().shots, 0);
        assert_eq!(mode.stats().on_target_time, 0.0);
        let summary = mode.summary(0.5, &Settings::default());
        assert_eq!(summary.accuracy01, 0.0);
    }

    #[test]
    fn test_reacquire_needs_prior_loss() {
        let mut mode = started(TrackInputMode::Passive);
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();

        // Off, then first acquisition: not a reacquire
        run(&mut mode, &ray, &mut events, 0, 10);
        ray.on_target.set(true);
        run(&mut mode, &ray, &mut events, 10, 10);
        assert_eq!(mode.stats().reacquire_count(), 0);

        // Lose it for 6 frames, then get it back
        ray.on_target.set(false);
        run(&mut mode, &ray, &mut events, 20, 6);
        ray.on_target.set(true);
        run(&mut mode, &ray, &mut events, 26, 1);

        assert_eq!(mode.stats().reacquire_count(), 1);
        assert!((mode.stats().reacquire_times[0] - 100.0).abs() < 1e-6);
        assert_eq!(mode.metrics(0.45).avg_response_ms, mode.stats().reacquire_times.first().copied());
    }

    #[test]
    fn test_segments_closed_by_summary() {
        let mut mode = started(TrackInputMode::Passive);
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();

        ray.on_target.set(true);
        run(&mut mode, &ray, &mut events, 0, 30);
        ray.on_target.set(false);
        run(&mut mode, &ray, &mut events, 30, 30);
        ray.on_target.set(true);
        run(&mut mode, &ray, &mut events, 60, 30);

        let summary = mode.summary(1.5, &Settings::default());
        let Some(SummaryDetails::Tracking { segments, .. }) = summary.details else {
            panic!("tracking details expected");
        };
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].end, 1.5);
        assert!((segments[0].duration() - 0.5).abs() < 1e-9);
        let covered: f64 = segments.iter().map(Segment::duration).sum();
        assert!((covered - mode.stats().on_target_time).abs() <= DT + 1e-9);

        // A second summary does not duplicate the closed segment
        let again = mode.summary(1.5, &Settings::default());
        let Some(SummaryDetails::Tracking { segments, .. }) = again.details else {
            panic!("tracking details expected");
        };
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_pause_stops_firing() {
        let mut mode = started(TrackInputMode::Hold);
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();
        mode.on_pointer_down(&mut context(0.0, &ray, &mut events));
        run(&mut mode, &ray, &mut events, 0, 3);
        mode.pause();
        assert!(!mode.is_firing());
        mode.resume();
        run(&mut mode, &ray, &mut events, 3, 30);
        assert_eq!(mode.stats().shots, 0);
    }

    #[test]
    fn test_same_seed_same_path() {
        let ray = ScriptedRaycaster::default();
        let mut events = Vec::new();
        let mut a = started(TrackInputMode::Passive);
        let mut b = started(TrackInputMode::Passive);
        run(&mut a, &ray, &mut events, 0, 120);
        run(&mut b, &ray, &mut events, 0, 120);
        assert_eq!(a.targets()[0].pos, b.targets()[0].pos);
    }

    #[test]
    fn test_metrics_label() {
        let mode = started(TrackInputMode::Passive);
        let metrics = mode.metrics(0.0);
        assert_eq!(metrics.extra_label, "On target");
        assert_eq!(metrics.extra_value, "0%");
        assert_eq!(metrics.avg_response_ms, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn passive_hits_match_on_target_time(frames in 1usize..400) {
            let mut mode = started(TrackInputMode::Passive);
            let ray = ScriptedRaycaster::default();
            ray.on_target.set(true);
            let mut events = Vec::new();
            run(&mut mode, &ray, &mut events, 0, frames);
            prop_assert_eq!(mode.stats().hits as usize, frames / 6);
            prop_assert_eq!(mode.stats().shots, mode.stats().hits);
        }

        #[test]
        fn hold_shots_match_fire_rate(frames in 1usize..400, on_target in any::<bool>()) {
            let mut mode = started(TrackInputMode::Hold);
            let ray = ScriptedRaycaster::default();
            ray.on_target.set(on_target);
            let mut events = Vec::new();
            mode.on_pointer_down(&mut context(0.0, &ray, &mut events));
            run(&mut mode, &ray, &mut events, 0, frames);
            prop_assert_eq!(mode.stats().shots as usize, frames / 5);
            let expected_hits = if on_target { frames / 5 } else { 0 };
            prop_assert_eq!(mode.stats().hits as usize, expected_hits);
        }

        #[test]
        fn target_stays_in_motion_area(seed in any::<u64>(), speed in 0.4f32..4.0, idx in 0usize..3) {
            let shape = [TargetShape::Circle, TargetShape::Ball, TargetShape::Capsule][idx];
            let settings = Settings {
                motion_speed: speed,
                target_shape: shape,
                ..Settings::default()
            };
            let mut mode = TrackMode::new(seed);
            mode.start(&settings, 0.0);
            let area = mode.motion_area();
            let ray = ScriptedRaycaster::default();
            let mut events = Vec::new();
            for frame in 0..300 {
                mode.update(&mut context(frame as f64 * 16.0, &ray, &mut events), DT);
                prop_assert!(area.contains(mode.targets()[0].pos));
            }
        }
    }
}
