//! User aggregate and the identity payload embedded in auth tokens.
//!
//! Construction validates invariants up front so the rest of the system can
//! rely on well-formed values. The password never leaves the domain layer:
//! [`User`] carries only the Argon2 hash and serialisation skips it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted password length for signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Role attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation errors raised while constructing user values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email is not well formed")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("unknown role: {value}")]
    UnknownRole { value: String },
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Accepts a trimmed `local@domain` shape; full RFC validation is the
    /// mail transport's concern.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity payload embedded in the signed token.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Validated signup request accepted by the auth service.
#[derive(Debug, Clone)]
pub struct NewSignup {
    name: String,
    email: Email,
    password: String,
}

impl NewSignup {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let password = password.into();
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserValidationError::PasswordTooShort);
        }
        Ok(Self {
            name,
            email: Email::new(email)?,
            password,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Login credentials as submitted by the client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

/// Opaque identity payload carried inside the signed token.
///
/// Round-trips through the token unchanged: the `/auth/test/` endpoint
/// echoes exactly what was signed at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("  ada@example.com  ", true)]
    #[case("ada@localhost", false)]
    #[case("@example.com", false)]
    #[case("ada", false)]
    #[case("", false)]
    fn email_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Email::new(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("", "ada@example.com", "longenough", UserValidationError::EmptyName)]
    #[case("Ada", "nope", "longenough", UserValidationError::InvalidEmail)]
    #[case("Ada", "ada@example.com", "short", UserValidationError::PasswordTooShort)]
    fn signup_rejects_invalid_input(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = NewSignup::new(name, email, password).expect_err("should be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn signup_trims_name() {
        let signup = NewSignup::new("  Ada  ", "ada@example.com", "longenough").expect("valid");
        assert_eq!(signup.name(), "Ada");
    }

    #[rstest]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().expect("parses"), role);
        }
    }

    #[rstest]
    fn user_serialisation_skips_password_hash() {
        let user = User {
            id: Uuid::nil(),
            name: "Ada".into(),
            email: Email::new("ada@example.com").expect("valid"),
            role: Role::Member,
            password_hash: "secret".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("serialises");
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
