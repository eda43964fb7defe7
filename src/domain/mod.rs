// SPDX-License-Identifier: MPL-2.0
//! Domain layer - value objects with ZERO external dependencies.
//!
//! - [`PollInterval`]: completeness poll period
//! - [`FadeDuration`]: opacity transition length
//! - [`CacheCapacity`]: decoded image cache size
//! - [`BufferCapacity`]: diagnostic event buffer size

mod newtypes;

pub use newtypes::{
    buffer_capacity_bounds, cache_capacity_bounds, fade_bounds, poll_interval_bounds,
    BufferCapacity, CacheCapacity, FadeDuration, PollInterval,
};
