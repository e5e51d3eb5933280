//! Shared Types

mod account;
mod identity;

pub use account::{DeleteAccountResponse, DependentTable, ErrorResponse};
pub use identity::{CallerIdentity, UserId};
