pub mod access;
mod pages;

pub use access::{AccessService, AccessState, access_routes};
pub use pages::access_gate_page;
