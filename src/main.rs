//! AimForge entry point
//!
//! On the web everything starts from the library's wasm start hook. Natively
//! this runs a headless session with a simple aim bot and prints the summary
//! as JSON.
//!
//! Usage: `aimforge [mode] [seconds]` (defaults: `track`, 10)

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use aimforge::consts::DEG_PER_MOUSE_UNIT;
    use aimforge::sim::View;
    use aimforge::{Game, GameEvent, SessionPhase, Settings};

    /// Frame time of the headless loop (seconds)
    const FRAME_DT: f64 = 1.0 / 120.0;
    /// Share of the aim error the bot corrects each frame
    const ASSIST_GAIN: f32 = 0.25;
    /// Click modes fire every this many frames
    const FIRE_EVERY: u64 = 24;

    /// Nudge the view toward the first live target
    fn steer(game: &mut Game) {
        let Some(target) = game
            .engine()
            .and_then(|engine| engine.targets().first())
            .map(|t| t.pos)
        else {
            return;
        };
        let view = *game.view();
        let aim = target - View::eye();
        let yaw = (-aim.x).atan2(-aim.z);
        let pitch = (aim.y / aim.length()).asin();

        let k = (DEG_PER_MOUSE_UNIT * game.session_settings().sensitivity).to_radians();
        let dx = -(yaw - view.yaw) * ASSIST_GAIN / k;
        let dy = -(pitch - view.pitch) * ASSIST_GAIN / k;
        game.pointer_move(dx, dy);
    }

    pub fn run() -> i32 {
        let mut args = std::env::args().skip(1);
        let mode = args.next().unwrap_or_else(|| "track".to_string());
        let seconds = args
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(10.0);
        log::info!("AimForge (native) starting: {} for {}s", mode, seconds);

        let settings = Settings {
            timer_seconds: seconds,
            crosshair_glow: true,
            ..Settings::default()
        };
        let mut game = Game::new(0x5eed);
        if let Err(e) = game.prepare_session(&mode, settings) {
            log::error!("{}", e);
            return 2;
        }
        game.begin_session();

        let mut frame: u64 = 0;
        let mut summary = None;
        while game.phase() == SessionPhase::Running {
            steer(&mut game);
            frame += 1;
            if frame % FIRE_EVERY == 0 && game.on_target_signal() {
                game.pointer_down();
                game.pointer_up();
            }
            game.tick(FRAME_DT);

            for event in game.drain_events() {
                match event {
                    GameEvent::SessionEnded(s) => summary = Some(s),
                    GameEvent::Toast(message) => log::info!("{}", message),
                    _ => {}
                }
            }
        }

        let Some(summary) = summary else {
            log::error!("Session ended without a summary");
            return 1;
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                log::error!("Failed to encode summary: {}", e);
                1
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    std::process::exit(headless::run());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start hook, this is just to satisfy the compiler
}
