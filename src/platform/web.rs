//! Browser bindings
//!
//! Wraps `Game` for JavaScript. Structured values cross the boundary as JSON
//! strings so the page can use them directly.

use wasm_bindgen::prelude::*;

use super::{CaptureError, PointerCapture};
use crate::persistence::{LastRun, LocalStorage};
use crate::settings::{Settings, SettingsPatch};
use crate::sim::{Game, GameEvent};

// JS binding for pointer lock on the stage canvas
#[wasm_bindgen(inline_js = "
    export function request_pointer_lock(id) {
        const canvas = document.getElementById(id);
        if (!canvas || !canvas.requestPointerLock) return false;
        if (canvas.focus) canvas.focus();
        const result = canvas.requestPointerLock();
        if (result && result.catch) result.catch(() => {});
        return true;
    }

    export function is_pointer_locked(id) {
        const el = document.pointerLockElement;
        return el !== null && el !== undefined && el.id === id;
    }

    export function exit_pointer_lock() {
        if (document.pointerLockElement) document.exitPointerLock();
    }
")]
extern "C" {
    fn request_pointer_lock(id: &str) -> bool;
    fn is_pointer_locked(id: &str) -> bool;
    fn exit_pointer_lock();
}

/// Pointer lock on a canvas element
pub struct CanvasPointerLock {
    canvas_id: String,
}

impl CanvasPointerLock {
    pub fn new(canvas_id: &str) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
        }
    }
}

impl PointerCapture for CanvasPointerLock {
    fn request(&mut self) -> Result<(), CaptureError> {
        if request_pointer_lock(&self.canvas_id) {
            Ok(())
        } else {
            Err(CaptureError::Rejected(format!(
                "no lockable element #{}",
                self.canvas_id
            )))
        }
    }

    fn is_captured(&self) -> bool {
        is_pointer_locked(&self.canvas_id)
    }

    fn release(&mut self) {
        exit_pointer_lock();
    }
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("AimForge starting...");
}

/// The session runtime as seen from the page
#[wasm_bindgen]
pub struct AimForge {
    game: Game,
    storage: LocalStorage,
}

#[wasm_bindgen]
impl AimForge {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> AimForge {
        let seed = js_sys::Date::now() as u64;
        let storage = LocalStorage::new();
        let settings = Settings::load(&storage);
        let mut game = Game::new(seed).with_pointer(Box::new(CanvasPointerLock::new(canvas_id)));
        game.set_settings(&SettingsPatch::from(&settings));
        Self { game, storage }
    }

    /// Current menu settings (JSON)
    pub fn settings(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.settings()).map_err(to_js)
    }

    /// Apply a partial settings update (JSON) and persist the result
    pub fn set_settings(&mut self, patch_json: &str) -> Result<(), JsValue> {
        let patch: SettingsPatch = serde_json::from_str(patch_json).map_err(to_js)?;
        self.game.set_settings(&patch);
        self.game.settings().save(&mut self.storage);
        Ok(())
    }

    /// Prepare `mode_id` with the current menu settings
    pub fn prepare_session(&mut self, mode_id: &str) -> Result<(), JsValue> {
        let settings = self.game.settings().clone();
        self.game.prepare_session(mode_id, settings).map_err(to_js)
    }

    pub fn start_countdown(&mut self) {
        self.game.start_countdown();
    }

    pub fn begin_session(&mut self) {
        self.game.begin_session();
    }

    pub fn pause(&mut self) {
        self.game.pause();
    }

    pub fn resume(&mut self) {
        self.game.resume();
    }

    pub fn finish_session(&mut self) {
        self.game.finish_session();
    }

    pub fn exit_to_menu(&mut self) {
        self.game.exit_to_menu();
    }

    pub fn pointer_move(&mut self, dx: f32, dy: f32) {
        self.game.pointer_move(dx, dy);
    }

    /// Mouse button pressed; only the primary button fires
    pub fn pointer_down(&mut self, button: i16) {
        if button == 0 {
            self.game.pointer_down();
        }
    }

    pub fn pointer_up(&mut self, button: i16) {
        if button == 0 {
            self.game.pointer_up();
        }
    }

    pub fn pointer_lock_changed(&mut self) {
        let locked = self.game.is_pointer_captured();
        self.game.pointer_lock_changed(locked);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.game.resize(width, height);
    }

    /// Advance one frame (`dt` in seconds)
    pub fn tick(&mut self, dt: f64) {
        self.game.tick(dt);
    }

    pub fn hud_snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.hud_snapshot()).map_err(to_js)
    }

    pub fn on_target_signal(&self) -> bool {
        self.game.on_target_signal()
    }

    /// Events since the last call (JSON array); stores finished sessions
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        let events = self.game.drain_events();
        for event in &events {
            if let GameEvent::SessionEnded(summary) = event {
                LastRun::new(summary, js_sys::Date::now()).save(&mut self.storage);
            }
        }
        serde_json::to_string(&events).map_err(to_js)
    }

    /// Menu lines for the stored last run, empty when there is none
    pub fn last_run_lines(&self) -> Vec<String> {
        LastRun::load(&self.storage)
            .map(|run| run.describe().to_vec())
            .unwrap_or_default()
    }
}
