//! Session state machine
//!
//! `Game` owns the view, the session clock and the active mode engine. The
//! host feeds it input and frame ticks and drains `GameEvent`s afterwards.
//! Time only moves through `tick`, so a session replays the same way for the
//! same seed and input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::countdown::Countdown;
use super::hit::{GeometryRaycaster, Raycaster};
use super::metrics::{HudSnapshot, Metrics, Summary};
use super::modes::{ModeContext, ModeEngine, ModeId};
use super::target::TargetId;
use super::view::View;
use crate::consts::*;
use crate::platform::{CaptureOutcome, CaptureRequest, HeadlessCapture, PointerCapture};
use crate::settings::{Settings, SettingsPatch, TrackInputMode};

const HINT_CAPTURE: &str = "Click the stage to lock the mouse (recommended).";
const HINT_UNLOCKED: &str = "Pointer unlocked - paused. Press P to resume (and click to lock).";
const HINT_HOLD: &str = "Hold left click while on target to score.";

/// Where the session lifecycle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No session; settings can be edited
    #[default]
    Menu,
    /// Engine started, waiting for the countdown or `begin_session`
    Ready,
    Running,
    Paused,
    /// Summary published; waiting for the player to leave
    Results,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Menu => "menu",
            SessionPhase::Ready => "ready",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::Results => "results",
        }
    }

    /// Whether a mode engine exists in this phase
    pub fn has_session(&self) -> bool {
        !matches!(self, SessionPhase::Menu)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

/// Everything the host reacts to, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum GameEvent {
    /// A scored hit (play the hit sound)
    TargetHit { target: Option<TargetId> },
    Hud(HudSnapshot),
    /// Final result, published once per session
    SessionEnded(Box<Summary>),
    /// Short hint for the player
    Toast(String),
    /// Countdown label to show
    Countdown(String),
    Capture(CaptureOutcome),
}

/// Session clock record
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionClock {
    /// Time limit in seconds (0 = untimed)
    pub duration: f64,
    /// Clock time the session (re)started, shifted on resume (ms)
    pub start_ms: Option<f64>,
    /// Seconds of running time
    pub elapsed: f64,
}

impl SessionClock {
    fn new(duration: f64) -> Self {
        Self {
            duration,
            start_ms: None,
            elapsed: 0.0,
        }
    }

    fn is_timed(&self) -> bool {
        self.duration > 0.0
    }

    /// Seconds left, `None` when untimed
    pub fn remaining(&self) -> Option<f64> {
        self.is_timed()
            .then(|| (self.duration - self.elapsed).max(0.0))
    }
}

/// Frame-rate sampler over fixed windows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct FpsCounter {
    frames: u32,
    accum: f64,
    fps: f64,
}

impl FpsCounter {
    fn sample(&mut self, dt: f64) {
        self.frames += 1;
        self.accum += dt;
        if self.accum >= FPS_WINDOW {
            let fps = self.frames as f64 / self.accum;
            self.fps = fps.clamp(0.0, MAX_FPS);
            self.frames = 0;
            self.accum = 0.0;
        }
    }
}

fn mode_context<'a>(
    now_ms: f64,
    session: &SessionClock,
    view: &View,
    raycaster: &'a dyn Raycaster,
    events: &'a mut Vec<GameEvent>,
) -> ModeContext<'a> {
    ModeContext {
        now_ms,
        start_ms: session.start_ms,
        elapsed: session.elapsed,
        ray: view.ray(),
        raycaster,
        events,
    }
}

/// The session runtime
pub struct Game {
    seed: u64,
    /// Sessions prepared so far; varies each engine's seed
    sessions: u64,
    /// Settings edited from the menu
    settings: Settings,
    /// Snapshot the current session was prepared with
    session_settings: Settings,
    phase: SessionPhase,
    mode_id: Option<ModeId>,
    engine: Option<Box<dyn ModeEngine>>,
    session: SessionClock,
    view: View,
    /// Clock time (ms), advanced by `tick`
    now_ms: f64,
    hud_accum: f64,
    fps: FpsCounter,
    countdown: Option<Countdown>,
    raycaster: Box<dyn Raycaster>,
    pointer: Box<dyn PointerCapture>,
    capture_request: Option<CaptureRequest>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a game in the menu, with geometric hit testing and headless capture
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sessions: 0,
            settings: Settings::default(),
            session_settings: Settings::default(),
            phase: SessionPhase::Menu,
            mode_id: None,
            engine: None,
            session: SessionClock::default(),
            view: View::default(),
            now_ms: 0.0,
            hud_accum: 0.0,
            fps: FpsCounter::default(),
            countdown: None,
            raycaster: Box::new(GeometryRaycaster),
            pointer: Box::new(HeadlessCapture::granting()),
            capture_request: None,
            events: Vec::new(),
        }
    }

    /// Replace hit resolution (scripted aim in tests, custom picking on hosts)
    pub fn with_raycaster(mut self, raycaster: Box<dyn Raycaster>) -> Self {
        self.raycaster = raycaster;
        self
    }

    pub fn with_pointer(mut self, pointer: Box<dyn PointerCapture>) -> Self {
        self.pointer = pointer;
        self
    }

    // --- Queries ---

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode_id(&self) -> Option<ModeId> {
        self.mode_id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings of the current session
    pub fn session_settings(&self) -> &Settings {
        &self.session_settings
    }

    pub fn session(&self) -> &SessionClock {
        &self.session
    }

    pub fn elapsed(&self) -> f64 {
        self.session.elapsed
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn engine(&self) -> Option<&dyn ModeEngine> {
        self.engine.as_deref()
    }

    pub fn is_pointer_captured(&self) -> bool {
        self.pointer.is_captured()
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current HUD numbers
    pub fn hud_snapshot(&self) -> HudSnapshot {
        let metrics = self
            .engine
            .as_ref()
            .map(|engine| engine.metrics(self.session.elapsed))
            .unwrap_or_default();
        HudSnapshot {
            phase: self.phase,
            mode_id: self.mode_id,
            elapsed: self.session.elapsed,
            remaining: self.session.remaining(),
            duration: self.session.duration,
            fps: self.fps.fps,
            metrics,
        }
    }

    /// Metrics of the active engine, zeroed when there is none
    pub fn metrics(&self) -> Metrics {
        self.hud_snapshot().metrics
    }

    /// Whether the crosshair glow should light up this frame
    pub fn on_target_signal(&self) -> bool {
        if self.phase != SessionPhase::Running || !self.session_settings.crosshair_glow {
            return false;
        }
        self.engine.as_ref().is_some_and(|engine| {
            let targets = engine.targets();
            !targets.is_empty() && self.raycaster.cast(&self.view.ray(), targets).is_some()
        })
    }

    // --- Lifecycle ---

    /// Edit the menu settings; a session in progress keeps its own copy
    pub fn set_settings(&mut self, patch: &SettingsPatch) {
        self.settings.apply(patch);
        if !self.phase.has_session() || self.phase == SessionPhase::Results {
            self.view.fov_deg = self.settings.fov_deg;
        }
    }

    /// Create and start the engine for `mode_id`, leaving the game in Ready
    pub fn prepare_session(&mut self, mode_id: &str, settings: Settings) -> Result<(), SessionError> {
        let id: ModeId = mode_id.parse()?;
        let settings = settings.sanitized();

        if let Some(mut old) = self.engine.take() {
            old.dispose();
        }
        self.countdown = None;
        self.sessions += 1;

        self.settings = settings.clone();
        self.session_settings = settings;
        self.view.reset_orientation();
        self.view.fov_deg = self.session_settings.fov_deg;
        self.session = SessionClock::new(self.session_settings.timer_seconds);
        self.hud_accum = 0.0;

        let mut engine = id.create(self.seed.wrapping_add(self.sessions));
        engine.start(&self.session_settings, self.now_ms);
        self.engine = Some(engine);
        self.mode_id = Some(id);
        self.phase = SessionPhase::Ready;
        log::info!(
            "Prepared {} ({}s, {})",
            id.name(),
            self.session_settings.timer_seconds,
            self.session_settings.target_shape.as_str()
        );

        if id == ModeId::Track && self.session_settings.track_input_mode == TrackInputMode::Hold {
            self.toast(HINT_HOLD);
        }
        self.request_capture(true);
        Ok(())
    }

    /// Run the 3-2-1 countdown; the session begins when it ends
    pub fn start_countdown(&mut self) {
        if self.phase != SessionPhase::Ready {
            return;
        }
        let countdown = Countdown::new();
        if let Some(label) = countdown.label() {
            self.events.push(GameEvent::Countdown(label.to_string()));
        }
        self.countdown = Some(countdown);
    }

    /// Ready -> Running
    pub fn begin_session(&mut self) {
        if self.phase != SessionPhase::Ready {
            return;
        }
        self.countdown = None;
        self.session.start_ms = Some(self.now_ms);
        self.session.elapsed = 0.0;
        self.hud_accum = 0.0;
        self.phase = SessionPhase::Running;
        log::info!("Session running");
        self.emit_hud();
    }

    /// Running -> Paused
    pub fn pause(&mut self) {
        if self.pause_session() {
            self.toast("Paused");
        }
    }

    fn pause_session(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.phase = SessionPhase::Paused;
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
        }
        log::info!("Paused at {:.2}s", self.session.elapsed);
        true
    }

    /// Paused -> Running, keeping the elapsed time
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.request_capture(false);
        self.session.start_ms = Some(self.now_ms - self.session.elapsed * 1000.0);
        if let Some(engine) = self.engine.as_mut() {
            engine.resume();
        }
        self.phase = SessionPhase::Running;
        log::info!("Resumed at {:.2}s", self.session.elapsed);
    }

    /// Build and publish the summary, then drop the engine; does nothing from
    /// Menu or Results
    pub fn finish_session(&mut self) -> Option<Summary> {
        if matches!(self.phase, SessionPhase::Menu | SessionPhase::Results) {
            return None;
        }
        self.phase = SessionPhase::Results;
        self.countdown = None;

        let mut engine = self.engine.take()?;
        let summary = engine.summary(self.session.elapsed, &self.session_settings);
        engine.dispose();
        log::info!(
            "{} finished: {}/{} hits, accuracy {:.1}%",
            summary.mode_name,
            summary.hits,
            summary.shots,
            summary.accuracy01 * 100.0
        );
        self.events
            .push(GameEvent::SessionEnded(Box::new(summary.clone())));
        self.release_capture();
        Some(summary)
    }

    /// Drop the session and go back to the menu
    pub fn exit_to_menu(&mut self) {
        if self.phase == SessionPhase::Menu {
            return;
        }
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
        }
        self.mode_id = None;
        self.countdown = None;
        self.session = SessionClock::default();
        self.phase = SessionPhase::Menu;
        self.release_capture();
        log::info!("Back to menu");
    }

    // --- Input ---

    /// Raw pointer delta; turns the view while running with capture held
    pub fn pointer_move(&mut self, dx: f32, dy: f32) {
        if self.phase != SessionPhase::Running || !self.pointer.is_captured() {
            return;
        }
        self.view
            .rotate(dx, dy, self.session_settings.sensitivity);
    }

    /// Fire button pressed
    pub fn pointer_down(&mut self) {
        if matches!(self.phase, SessionPhase::Ready | SessionPhase::Running)
            && !self.pointer.is_captured()
        {
            self.request_capture(false);
        }
        if self.phase != SessionPhase::Running {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            let mut ctx = mode_context(
                self.now_ms,
                &self.session,
                &self.view,
                self.raycaster.as_ref(),
                &mut self.events,
            );
            engine.on_pointer_down(&mut ctx);
        }
    }

    /// Fire button released
    pub fn pointer_up(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            let mut ctx = mode_context(
                self.now_ms,
                &self.session,
                &self.view,
                self.raycaster.as_ref(),
                &mut self.events,
            );
            engine.on_pointer_up(&mut ctx);
        }
    }

    /// Host report of a capture change; losing it mid-session pauses
    pub fn pointer_lock_changed(&mut self, locked: bool) {
        if !locked && self.pause_session() {
            self.toast(HINT_UNLOCKED);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.resize(width, height);
    }

    // --- Frame ---

    /// Advance the clock by `dt` seconds and run one frame
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.now_ms += dt * 1000.0;
        self.fps.sample(dt);
        self.poll_capture();
        // The frame that ends the countdown belongs to it, not to the session
        if self.advance_countdown(dt) || self.phase != SessionPhase::Running {
            return;
        }
        if let Some(start) = self.session.start_ms {
            self.session.elapsed = ((self.now_ms - start) / 1000.0).max(0.0);
        }

        if self.session.is_timed() && self.session.elapsed >= self.session.duration {
            self.finish_session();
        } else if let Some(engine) = self.engine.as_mut() {
            let mut ctx = mode_context(
                self.now_ms,
                &self.session,
                &self.view,
                self.raycaster.as_ref(),
                &mut self.events,
            );
            engine.update(&mut ctx, dt);
        }

        self.hud_accum += dt;
        if self.hud_accum >= HUD_INTERVAL {
            self.hud_accum = 0.0;
            self.emit_hud();
        }
    }

    /// Returns whether the countdown began the session this frame
    fn advance_countdown(&mut self, dt: f64) -> bool {
        let Some(countdown) = self.countdown.as_mut() else {
            return false;
        };
        let mut shown = Vec::new();
        let finished = countdown.advance(dt * 1000.0, &mut shown);
        self.events
            .extend(shown.into_iter().map(|label| GameEvent::Countdown(label.to_string())));
        if finished {
            self.countdown = None;
            self.begin_session();
        }
        finished
    }

    // --- Capture ---

    fn request_capture(&mut self, hint_on_failure: bool) {
        if self.pointer.is_captured() || self.capture_request.is_some() {
            return;
        }
        match CaptureRequest::start(self.pointer.as_mut(), self.now_ms) {
            Ok(request) => self.capture_request = Some(request),
            Err(e) => {
                log::warn!("Pointer capture unavailable: {}", e);
                self.events.push(GameEvent::Capture(CaptureOutcome::Failed));
                if hint_on_failure {
                    self.toast(HINT_CAPTURE);
                }
            }
        }
    }

    fn poll_capture(&mut self) {
        let Some(request) = self.capture_request else {
            return;
        };
        let Some(outcome) = request.poll(self.pointer.as_ref(), self.now_ms) else {
            return;
        };
        self.capture_request = None;
        self.events.push(GameEvent::Capture(outcome));
        match outcome {
            CaptureOutcome::Acquired => log::debug!("Pointer captured"),
            _ => {
                log::warn!("Pointer capture timed out");
                if self.phase == SessionPhase::Ready {
                    self.toast(HINT_CAPTURE);
                }
            }
        }
    }

    fn release_capture(&mut self) {
        self.capture_request = None;
        if self.pointer.is_captured() {
            self.pointer.release();
        }
    }

    fn toast(&mut self, message: &str) {
        self.events.push(GameEvent::Toast(message.to_string()));
    }

    fn emit_hud(&mut self) {
        let snapshot = self.hud_snapshot();
        self.events.push(GameEvent::Hud(snapshot));
    }
}
