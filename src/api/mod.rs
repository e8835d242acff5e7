//! HTTP surface
//!
//! Only the link access routes live here; management goes through the CLI.

pub mod constants;
pub mod services;

pub use services::{AccessState, access_routes};
