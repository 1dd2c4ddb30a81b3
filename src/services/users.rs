// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration, profiles and activation.

use crate::db::LedgerStore;
use crate::error::{AppError, Result};
use crate::models::user::find_charity_account;
pub use crate::models::user::{activation_code, ACTIVATION_CODE_PREFIX};
use crate::models::{Booking, User, UserRole, UserStats};
use crate::services::policy;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Fresh ids tried before registration gives up on activation code clashes.
const MAX_ID_ATTEMPTS: usize = 5;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub role: UserRole,
    pub hourly_rate: Option<u64>,
    #[validate(length(min = 1, max = 32))]
    pub charity_account_number: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<dyn LedgerStore>,
}

impl UserService {
    pub fn new(db: Arc<dyn LedgerStore>) -> Self {
        Self { db }
    }

    /// Register a user. Mentors must name an hourly rate and a known charity
    /// account; mentees must not carry either.
    pub fn register(&self, request: NewUser, now: DateTime<Utc>) -> Result<User> {
        request.validate()?;

        let (hourly_rate, charity_account_number) = match request.role {
            UserRole::Mentor => {
                let rate = request.hourly_rate.ok_or_else(|| {
                    AppError::BadRequest("mentors need an hourly_rate".to_string())
                })?;
                let account = request.charity_account_number.ok_or_else(|| {
                    AppError::BadRequest("mentors need a charity_account_number".to_string())
                })?;
                if find_charity_account(&account).is_none() {
                    return Err(AppError::BadRequest(format!(
                        "unknown charity account {}",
                        account
                    )));
                }
                (Some(rate), Some(account))
            }
            UserRole::Mentee => {
                if request.hourly_rate.is_some() || request.charity_account_number.is_some() {
                    return Err(AppError::BadRequest(
                        "only mentors have a rate and charity account".to_string(),
                    ));
                }
                (None, None)
            }
        };

        let mut user = User {
            id: String::new(),
            name: request.name.trim().to_string(),
            role: request.role,
            is_activated: false,
            hourly_rate,
            charity_account_number,
            created_at: format_utc_rfc3339(now),
        };

        // The store refuses an id whose activation code is already bound to
        // another user; draw again when that happens.
        let mut attempt = 1;
        loop {
            user.id = uuid::Uuid::new_v4().simple().to_string();
            match self.db.insert_user(&user) {
                Ok(()) => break,
                Err(AppError::Database(reason)) if attempt < MAX_ID_ATTEMPTS => {
                    tracing::warn!(attempt, reason = %reason, "Regenerating user id");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(user_id = %user.id, role = ?user.role, "User registered");
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    /// The user together with totals derived from their bookings.
    pub fn profile(&self, user_id: &str) -> Result<(User, UserStats)> {
        let user = self.get_user(user_id)?;
        let bookings = self.db.list_bookings_by_user(user_id)?;
        let stats = UserStats::from_bookings(user_id, &bookings);
        Ok((user, stats))
    }

    pub fn list_mentors(&self) -> Result<Vec<User>> {
        self.db.list_users_by_role(UserRole::Mentor)
    }

    /// Finished, unpaid sessions the user owes as mentee.
    pub fn debt(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Booking>> {
        let bookings = self.db.list_bookings_by_user(user_id)?;
        Ok(policy::debt_of(&bookings, user_id, now))
    }

    /// Flip `is_activated`. Repeated calls are no-ops.
    pub fn activate(&self, user_id: &str) -> Result<User> {
        let mut changed = false;
        let user = self.db.update_user(user_id, &mut |u| {
            changed = !u.is_activated;
            u.is_activated = true;
            Ok(())
        })?;

        if changed {
            tracing::info!(user_id, "User activated");
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryLedger;
    use chrono::TimeZone;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryLedger::new()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 27, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_activation_code() {
        assert_eq!(activation_code("ab12cdef"), "HOCTUTHIEN KICHHOAT AB12CD");
        assert_eq!(activation_code("u1"), "HOCTUTHIEN KICHHOAT U1");
    }

    #[test]
    fn test_register_mentor_requires_known_account() {
        let users = service();

        let err = users
            .register(
                NewUser {
                    name: "Lan".to_string(),
                    role: UserRole::Mentor,
                    hourly_rate: Some(100_000),
                    charity_account_number: Some("9999".to_string()),
                },
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mentor = users
            .register(
                NewUser {
                    name: "Lan".to_string(),
                    role: UserRole::Mentor,
                    hourly_rate: Some(100_000),
                    charity_account_number: Some("1111".to_string()),
                },
                now(),
            )
            .unwrap();
        assert!(!mentor.is_activated);
        assert_eq!(users.list_mentors().unwrap().len(), 1);
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let err = service()
            .register(
                NewUser {
                    name: String::new(),
                    role: UserRole::Mentee,
                    hourly_rate: None,
                    charity_account_number: None,
                },
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let users = service();
        let mentee = users
            .register(
                NewUser {
                    name: "Minh".to_string(),
                    role: UserRole::Mentee,
                    hourly_rate: None,
                    charity_account_number: None,
                },
                now(),
            )
            .unwrap();

        assert!(users.activate(&mentee.id).unwrap().is_activated);
        assert!(users.activate(&mentee.id).unwrap().is_activated);
        assert!(matches!(
            users.activate("missing"),
            Err(AppError::NotFound(_))
        ));
    }
}
