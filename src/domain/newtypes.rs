// SPDX-License-Identifier: MPL-2.0
//! Loading pipeline newtypes.
//!
//! Type-safe wrappers that keep configurable values inside their valid
//! ranges, so call sites never clamp by hand.

use std::time::Duration;

// =============================================================================
// Bounds
// =============================================================================

/// Completeness poll interval bounds (10 ms to 1 s).
pub mod poll_interval_bounds {
    /// Minimum interval in milliseconds.
    pub const MIN_MS: u64 = 10;
    /// Maximum interval in milliseconds.
    pub const MAX_MS: u64 = 1000;
    /// Default interval in milliseconds.
    pub const DEFAULT_MS: u64 = 50;
}

/// Fade duration bounds (0 to 5 s). Zero disables the transition.
pub mod fade_bounds {
    /// Maximum duration in milliseconds.
    pub const MAX_MS: u64 = 5000;
}

/// Decoded image cache bounds (1 to 512 entries).
pub mod cache_capacity_bounds {
    pub const MIN: usize = 1;
    pub const MAX: usize = 512;
    pub const DEFAULT: usize = 32;
}

/// Diagnostic buffer bounds (10 to 10000 events).
pub mod buffer_capacity_bounds {
    pub const MIN: usize = 10;
    pub const MAX: usize = 10_000;
    pub const DEFAULT: usize = 1000;
}

// =============================================================================
// PollInterval
// =============================================================================

/// Period between two completeness checks of a loading image.
///
/// # Example
///
/// ```
/// use iced_lazy_img::domain::PollInterval;
///
/// assert_eq!(PollInterval::default().as_millis(), 50);
/// assert_eq!(PollInterval::from_millis(1).as_millis(), 10); // clamped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(u64);

impl PollInterval {
    /// Creates an interval, clamping to the valid range.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.clamp(poll_interval_bounds::MIN_MS, poll_interval_bounds::MAX_MS))
    }

    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(poll_interval_bounds::DEFAULT_MS)
    }
}

// =============================================================================
// FadeDuration
// =============================================================================

/// Length of an opacity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeDuration(u64);

impl FadeDuration {
    /// Creates a duration, capping at the maximum.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.min(fade_bounds::MAX_MS))
    }

    /// A fade that completes immediately.
    #[must_use]
    pub fn instant() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    #[must_use]
    pub fn is_instant(self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// CacheCapacity
// =============================================================================

/// Number of decoded images the loader keeps in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheCapacity(usize);

impl CacheCapacity {
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(cache_capacity_bounds::MIN, cache_capacity_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for CacheCapacity {
    fn default() -> Self {
        Self(cache_capacity_bounds::DEFAULT)
    }
}

// =============================================================================
// BufferCapacity
// =============================================================================

/// Capacity of the diagnostic event ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity(usize);

impl BufferCapacity {
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(buffer_capacity_bounds::MIN, buffer_capacity_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self(buffer_capacity_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================
