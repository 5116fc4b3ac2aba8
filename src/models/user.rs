//! User data model
//!
//! `NewUser` is what arrives from a client, [`ValidateUserPipe`] turns it into
//! a storable [`UserRecord`], and [`UserView`] is the read shape, which never
//! carries the password.

use crate::pipe::builtins::{NormalizeEmailPipe, TrimPipe};
use crate::pipe::{Pipe, PipeError, PipeResult};
use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .expect("email pattern is a valid regex")
});

/// Unvalidated sign-up input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user as stored in the `users` collection
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    password: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Read projection of a user, password excluded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Validates and normalizes sign-up input
///
/// Rules: name required, trimmed, 2 to 50 characters; email required,
/// trimmed, lower-cased and well formed; password required, at least 6
/// characters. Every violated rule is reported, not only the first.
#[derive(Default)]
pub struct ValidateUserPipe;

#[async_trait]
impl Pipe for ValidateUserPipe {
    type Input = NewUser;
    type Output = UserRecord;

    async fn transform(&self, input: NewUser) -> PipeResult<UserRecord> {
        let mut errors = Vec::new();

        let name = TrimPipe.transform(input.name.unwrap_or_default()).await?;
        let name_len = name.chars().count();
        if name.is_empty() {
            errors.push("Name is required".to_owned());
        } else if name_len < NAME_MIN_LEN {
            errors.push(format!("Name must be at least {NAME_MIN_LEN} characters"));
        } else if name_len > NAME_MAX_LEN {
            errors.push(format!("Name cannot exceed {NAME_MAX_LEN} characters"));
        }

        let email = NormalizeEmailPipe
            .transform(input.email.unwrap_or_default())
            .await?;
        if email.is_empty() {
            errors.push("Email is required".to_owned());
        } else if !EMAIL_PATTERN.is_match(&email) {
            errors.push("Please enter a valid email".to_owned());
        }

        let password = input.password.unwrap_or_default();
        if password.is_empty() {
            errors.push("Password is required".to_owned());
        } else if password.chars().count() < PASSWORD_MIN_LEN {
            errors.push(format!(
                "Password must be at least {PASSWORD_MIN_LEN} characters"
            ));
        }

        if !errors.is_empty() {
            return Err(PipeError::Validation(errors));
        }

        let now = DateTime::now();
        Ok(UserRecord {
            id: None,
            name,
            email,
            password,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::StatusCode;
    use crate::error::DomainError;

    fn input(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[tokio::test]
    async fn test_valid_user_is_normalized() {
        let record = ValidateUserPipe
            .transform(input("  Ada Lovelace ", " ADA@Example.com ", "secret1"))
            .await
            .unwrap();

        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.password, "secret1");
        assert!(record.id.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn test_missing_fields_report_every_rule() {
        let err = ValidateUserPipe
            .transform(NewUser::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.messages(),
            ["Name is required", "Email is required", "Password is required"]
        );
    }

    #[tokio::test]
    async fn test_length_rules() {
        let err = ValidateUserPipe
            .transform(input("A", "a@b.io", "12345"))
            .await
            .unwrap_err();
        assert_eq!(
            err.messages(),
            [
                "Name must be at least 2 characters",
                "Password must be at least 6 characters"
            ]
        );

        let long_name = "x".repeat(51);
        let err = ValidateUserPipe
            .transform(input(&long_name, "a@b.io", "123456"))
            .await
            .unwrap_err();
        assert_eq!(err.messages(), ["Name cannot exceed 50 characters"]);
    }

    #[tokio::test]
    async fn test_email_format() {
        for bad in ["plainaddress", "a@b", "a@b.c", "a@@b.com", "a b@c.com", "a@b.comms"] {
            let err = ValidateUserPipe
                .transform(input("Ada", bad, "123456"))
                .await
                .unwrap_err();
            assert_eq!(err.messages(), ["Please enter a valid email"], "{bad}");
        }

        for good in ["first.last@example.com", "a-b@mail.example.org", "x_1@y.co"] {
            assert!(
                ValidateUserPipe
                    .transform(input("Ada", good, "123456"))
                    .await
                    .is_ok(),
                "{good}"
            );
        }
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let err = ValidateUserPipe
            .transform(input("", "", "123456"))
            .await
            .unwrap_err();
        let domain = DomainError::from(err);
        assert_eq!(domain.status(), StatusCode::BadRequest);
        assert_eq!(domain.message(), "Name is required, Email is required");
    }

    #[test]
    fn test_debug_redacts_password() {
        let now = DateTime::now();
        let record = UserRecord {
            id: None,
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "hunter22".to_owned(),
            created_at: now,
            updated_at: now,
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("<redacted>"));
    }
}
