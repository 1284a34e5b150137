//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Pointer capture (pointer lock on the web, always granted headless)
//! - JS bindings for the session runtime (WASM only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::CAPTURE_TIMEOUT_MS;

/// Why a capture request could not be made
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("pointer capture is not supported here")]
    Unsupported,
    #[error("pointer capture rejected: {0}")]
    Rejected(String),
}

/// Exclusive ownership of raw pointer deltas
pub trait PointerCapture {
    /// Ask for capture; success only means the request went out
    fn request(&mut self) -> Result<(), CaptureError>;

    fn is_captured(&self) -> bool;

    fn release(&mut self);
}

/// How a capture request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureOutcome {
    Acquired,
    /// The request could not be made at all
    Failed,
    /// Capture did not arrive within `CAPTURE_TIMEOUT_MS`
    TimedOut,
}

/// A capture request in flight, polled once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    started_ms: f64,
}

impl CaptureRequest {
    /// Send a request, or report why it could not be sent
    pub fn start(capture: &mut dyn PointerCapture, now_ms: f64) -> Result<Self, CaptureError> {
        capture.request()?;
        log::debug!("Pointer capture requested at {:.0} ms", now_ms);
        Ok(Self { started_ms: now_ms })
    }

    /// `None` while still waiting
    pub fn poll(&self, capture: &dyn PointerCapture, now_ms: f64) -> Option<CaptureOutcome> {
        if capture.is_captured() {
            Some(CaptureOutcome::Acquired)
        } else if now_ms - self.started_ms > CAPTURE_TIMEOUT_MS {
            Some(CaptureOutcome::TimedOut)
        } else {
            None
        }
    }
}

/// Capture for native runs and tests
///
/// Grants every request immediately unless built with `denying`.
#[derive(Debug, Clone, Default)]
pub struct HeadlessCapture {
    deny: bool,
    captured: bool,
}

impl HeadlessCapture {
    pub fn granting() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            captured: false,
        }
    }
}

impl PointerCapture for HeadlessCapture {
    fn request(&mut self) -> Result<(), CaptureError> {
        if self.deny {
            return Err(CaptureError::Unsupported);
        }
        self.captured = true;
        Ok(())
    }

    fn is_captured(&self) -> bool {
        self.captured
    }

    fn release(&mut self) {
        self.captured = false;
    }
}
