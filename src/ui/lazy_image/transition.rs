// SPDX-License-Identifier: MPL-2.0
//! Opacity fades.

use std::time::Instant;

use crate::domain::FadeDuration;

/// A fade-in from transparent to opaque.
///
/// A fade that was never started reads as fully opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    started_at: Option<Instant>,
    duration: FadeDuration,
}

impl Fade {
    #[must_use]
    pub fn new(duration: FadeDuration) -> Self {
        Self {
            started_at: None,
            duration,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn set_duration(&mut self, duration: FadeDuration) {
        self.duration = duration;
    }

    /// Linear progress in `0.0..=1.0`.
    #[must_use]
    pub fn opacity_at(&self, now: Instant) -> f32 {
        let Some(started_at) = self.started_at else {
            return 1.0;
        };
        if self.duration.is_instant() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started_at).as_secs_f32();
        (elapsed / self.duration.as_duration().as_secs_f32()).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_running(&self, now: Instant) -> bool {
        self.opacity_at(now) < 1.0
    }
}
