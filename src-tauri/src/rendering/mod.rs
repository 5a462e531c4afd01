//! Icon rendering.

pub mod badge;

pub use badge::{badge_text, unread_count, BadgeRenderer, TrayStatus};
