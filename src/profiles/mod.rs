//! Built-in routing profiles
//!
//! Each profile implements tag semantics for acceptance and preference.

pub mod hike;

pub use hike::HikeProfile;
