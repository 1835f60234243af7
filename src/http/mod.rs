//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! inbound connection
//!     → server.rs (Axum setup, proxy pipeline handler)
//!     → home.rs (landing page when resolution finds no target)
//! ```

pub mod home;
pub mod server;

pub use server::{AppState, HttpServer};
