//! Data models for the CommunityConnect marketplace.
//!
//! Wire format is camelCase JSON; database columns are the snake_case equivalents.

mod application;
mod profile;
mod session;
mod task;
mod vocabulary;

pub use application::*;
pub use profile::*;
pub use session::*;
pub use task::*;
pub use vocabulary::*;
