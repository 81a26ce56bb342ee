//! Point-in-time host metrics snapshots.
//!
//! Collect CPU, memory, disk and network figures with
//! [`system::Collector`], then render the resulting
//! [`system::SystemSnapshot`] as JSON or plain-text tables with
//! [`render::render`]. Collection never fails as a whole: each category
//! degrades to an empty value and reports a [`diagnostics::Diagnostic`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod system;
