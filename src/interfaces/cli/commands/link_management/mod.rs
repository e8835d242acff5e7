//! Link management commands
//!
//! This module provides CLI commands for managing file links.

mod add;
mod list;
mod remove;
mod update;

pub use add::add_link;
pub use list::{browse_link, list_links, show_link};
pub use remove::{clear_expired, remove_link};
pub use update::update_link;
