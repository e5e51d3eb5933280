//! Account Deletion Types

use serde::{Deserialize, Serialize};

/// A record set owned by a captain that must be purged before the auth account.
///
/// Variants are declared in deletion order: children first, the `captains`
/// profile row last, so foreign keys never block a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentTable {
    /// Reviews written by the captain.
    Reviews,
    /// Trade history.
    Trades,
    /// Viewing history.
    VoyageLogs,
    /// Wishlist entries.
    TreasureMaps,
    /// Cart entries.
    Cargo,
    /// The captain profile itself.
    Captains,
}

impl DependentTable {
    /// All dependent tables, in the order they must be deleted.
    pub const PURGE_ORDER: [Self; 6] = [
        Self::Reviews,
        Self::Trades,
        Self::VoyageLogs,
        Self::TreasureMaps,
        Self::Cargo,
        Self::Captains,
    ];

    /// Table name in the data store.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Trades => "trades",
            Self::VoyageLogs => "voyage_logs",
            Self::TreasureMaps => "treasure_maps",
            Self::Cargo => "cargo",
            Self::Captains => "captains",
        }
    }

    /// Column holding the owning auth account ID.
    pub const fn owner_column(self) -> &'static str {
        match self {
            Self::Captains => "id",
            _ => "captain_id",
        }
    }
}

/// Body returned when the account was fully deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl DeleteAccountResponse {
    /// The success body.
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: "Account deleted successfully".to_string(),
        }
    }
}

/// Body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
