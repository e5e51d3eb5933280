//! Account Deletion Module
//!
//! Self-service removal of a captain's account: dependent rows first, the
//! auth account last.

pub mod error;
pub mod handlers;
pub mod purge;

pub use error::AccountError;
pub use handlers::delete_user;
pub use purge::{purge_dependent_records, PurgeReport, PurgeStep, StepOutcome};
