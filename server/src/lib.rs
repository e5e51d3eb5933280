//! Plank Server
//!
//! Self-service account deletion for a Supabase-backed marketplace.
//! Verifies the caller's token, purges the rows the captain owns and
//! removes the auth account.

pub mod account;
pub mod api;
pub mod config;
pub mod upstream;
