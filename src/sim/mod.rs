//! Session and mode runtime
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `Game::tick`
//! - Seeded RNG only (one per mode engine)
//! - Stable iteration order (targets by spawn order)
//! - No rendering or platform dependencies beyond the capture trait

pub mod countdown;
pub mod hit;
pub mod metrics;
pub mod modes;
pub mod session;
pub mod shape;
pub mod target;
pub mod view;

pub use countdown::Countdown;
pub use hit::{GeometryRaycaster, Ray, RayHit, Raycaster};
pub use metrics::{HudSnapshot, Metrics, ModeStats, Segment, Summary, SummaryDetails, TimelinePoint};
pub use modes::{ModeEngine, ModeId};
pub use session::{Game, GameEvent, SessionClock, SessionError, SessionPhase};
pub use target::{Target, TargetId};
pub use view::View;
