//! Plank Common Library
//!
//! Wire types shared by the account deletion service and the apps that call it.

pub mod types;

pub use types::*;
