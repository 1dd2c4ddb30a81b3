//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Prefix of every activation payment code.
pub const ACTIVATION_CODE_PREFIX: &str = "HOCTUTHIEN KICHHOAT";

/// Which side of a session a user sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Mentor,
    Mentee,
}

/// User profile stored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    /// Unique, immutable ID
    pub id: String,
    /// Display name
    pub name: String,
    pub role: UserRole,
    /// Set once the activation donation is confirmed; never reverts
    pub is_activated: bool,
    /// Donation per hour of session (mentors only, VND)
    #[serde(default)]
    pub hourly_rate: Option<u64>,
    /// Charity account receiving this mentor's session donations
    #[serde(default)]
    pub charity_account_number: Option<String>,
    /// Registration timestamp (RFC3339)
    pub created_at: String,
}

impl User {
    pub fn is_mentor(&self) -> bool {
        self.role == UserRole::Mentor
    }

    pub fn is_mentee(&self) -> bool {
        self.role == UserRole::Mentee
    }

    /// Narrative token that confirms this user's activation donation.
    pub fn activation_code(&self) -> String {
        activation_code(&self.id)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// `HOCTUTHIEN KICHHOAT` followed by the first six characters of the id, upper-cased.
pub fn activation_code(user_id: &str) -> String {
    let short: String = user_id.chars().take(6).collect();
    format!("{} {}", ACTIVATION_CODE_PREFIX, short.to_uppercase())
}

/// Public subset of a user, used in leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

/// A charity bank account listed on Thien Nguyen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharityAccount {
    pub code: &'static str,
    pub name: &'static str,
    pub bank: &'static str,
}

/// Charity accounts a mentor may direct donations to.
pub const CHARITY_ACCOUNTS: &[CharityAccount] = &[
    CharityAccount {
        code: "2000",
        name: "Hoàng Hoa Trung - Dự án Nuôi Em",
        bank: "MBBank",
    },
    CharityAccount {
        code: "1111",
        name: "Quỹ Trò Nghèo Vùng Cao",
        bank: "MBBank",
    },
];

/// Look up a known charity account by its short code.
pub fn find_charity_account(code: &str) -> Option<&'static CharityAccount> {
    CHARITY_ACCOUNTS.iter().find(|a| a.code == code)
}
