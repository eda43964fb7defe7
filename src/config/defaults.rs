// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Ratio**: Aspect ratio fallback before any image is known
//! - **Polling**: Completeness poll interval bounds
//! - **Transitions**: Fade durations for image and content layers
//! - **Network**: Request timeout and body size limit
//! - **Cache**: Decoded image cache size
//! - **Diagnostics**: Event buffer capacity

// ==========================================================================
// Ratio Defaults
// ==========================================================================

/// Natural ratio (height / width) assumed until an image reports its size.
pub const DEFAULT_NATURAL_RATIO: f32 = 0.5;

// ==========================================================================
// Polling Defaults
// ==========================================================================

/// Interval between completeness checks after the load event (in ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Minimum completeness poll interval (in ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Maximum completeness poll interval (in ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 1000;

// ==========================================================================
// Transition Defaults
// ==========================================================================

/// Fade-in duration of a freshly loaded image layer (in ms).
pub const DEFAULT_IMAGE_FADE_MS: u64 = 280;

/// Fade-in duration of the content / loading layer (in ms).
pub const DEFAULT_CONTENT_FADE_MS: u64 = 300;

/// Longest fade accepted from configuration (in ms).
pub const MAX_FADE_MS: u64 = 5000;

// ==========================================================================
// Network Defaults
// ==========================================================================

/// Timeout for a single HTTP image request (in seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest image body the loader accepts (in megabytes).
pub const DEFAULT_MAX_IMAGE_MB: u64 = 64;

// ==========================================================================
// Cache Defaults
// ==========================================================================

/// Number of decoded images kept in memory.
pub const DEFAULT_CACHE_ENTRIES: usize = 32;

/// Minimum decoded cache size (1 keeps the current image only).
pub const MIN_CACHE_ENTRIES: usize = 1;

/// Maximum decoded cache size.
pub const MAX_CACHE_ENTRIES: usize = 512;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Default number of diagnostic events retained.
pub const DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY: usize = 1000;

/// Minimum diagnostics buffer capacity.
pub const MIN_DIAGNOSTICS_BUFFER_CAPACITY: usize = 10;

/// Maximum diagnostics buffer capacity.
pub const MAX_DIAGNOSTICS_BUFFER_CAPACITY: usize = 10_000;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(DEFAULT_NATURAL_RATIO > 0.0);

    assert!(MIN_POLL_INTERVAL_MS > 0);
    assert!(MAX_POLL_INTERVAL_MS >= MIN_POLL_INTERVAL_MS);
    assert!(DEFAULT_POLL_INTERVAL_MS >= MIN_POLL_INTERVAL_MS);
    assert!(DEFAULT_POLL_INTERVAL_MS <= MAX_POLL_INTERVAL_MS);

    assert!(DEFAULT_IMAGE_FADE_MS <= MAX_FADE_MS);
    assert!(DEFAULT_CONTENT_FADE_MS <= MAX_FADE_MS);

    assert!(DEFAULT_REQUEST_TIMEOUT_SECS > 0);
    assert!(DEFAULT_MAX_IMAGE_MB > 0);

    assert!(MIN_CACHE_ENTRIES > 0);
    assert!(MAX_CACHE_ENTRIES >= MIN_CACHE_ENTRIES);
    assert!(DEFAULT_CACHE_ENTRIES >= MIN_CACHE_ENTRIES);
    assert!(DEFAULT_CACHE_ENTRIES <= MAX_CACHE_ENTRIES);

    assert!(MIN_DIAGNOSTICS_BUFFER_CAPACITY > 0);
    assert!(MAX_DIAGNOSTICS_BUFFER_CAPACITY >= MIN_DIAGNOSTICS_BUFFER_CAPACITY);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY >= MIN_DIAGNOSTICS_BUFFER_CAPACITY);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY <= MAX_DIAGNOSTICS_BUFFER_CAPACITY);
};
