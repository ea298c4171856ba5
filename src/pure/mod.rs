//! The pure state of the window manager: no X server required.
//!
//! Everything in this module operates on plain data. The [core
//! manager](crate::core::WindowManager) mutates this state in response to
//! X events and then issues the X requests needed to make the server
//! reflect it, which keeps the bookkeeping itself testable without a
//! running display.
pub mod client;
pub mod geometry;
pub mod monitor;

pub use client::Client;
pub use monitor::Monitor;
