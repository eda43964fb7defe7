// SPDX-License-Identifier: MPL-2.0
pub mod animated_spinner;
pub mod ratio_box;

pub use animated_spinner::AnimatedSpinner;
pub use ratio_box::{ratio_box, RatioBox};
