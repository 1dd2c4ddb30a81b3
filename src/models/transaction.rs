//! Bank transaction as reported by the external feed.

use serde::{Deserialize, Serialize};

/// A transfer into a charity account. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Local time as reported by the bank, no timezone ("2025-11-27T18:59:00")
    pub transaction_time: String,
    /// Amount in VND
    pub amount: u64,
    /// Free-text narrative typed by the payer
    pub description: String,
    pub account_number: String,
}
