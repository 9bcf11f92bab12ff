//! Signup and login use-cases.
//!
//! Business failures are returned as `Err(Error)` with a request-side code;
//! side channels (welcome mail task, socket notification, audit document)
//! are best-effort and never fail the request. The welcome mail is
//! dispatched fire-and-forget to the task queue; the worker process owns
//! delivery and retries.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::error::Error;
use super::password::{hash_password, verify_password};
use super::ports::{
    AuditEvent, AuditTrail, Notification, NotificationBus, PersistenceError, TaskDispatcher,
    UserRepository, WelcomeEmailJob,
};
use super::token::TokenCodec;
use super::user::{Credentials, NewSignup, Role, User};

/// Successful login payload: the signed token plus the public user record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

fn map_persistence_error(error: PersistenceError) -> Error {
    match error {
        PersistenceError::Connection { message } => Error::service_unavailable(message),
        PersistenceError::Duplicate { field } => {
            Error::conflict(format!("{field} is already registered"))
                .with_details(json!({ "field": field }))
        }
        PersistenceError::Query { message } => Error::internal(message),
    }
}

/// Signup/login service over the user repository and side-channel ports.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskDispatcher>,
    notifications: Arc<dyn NotificationBus>,
    audit: Arc<dyn AuditTrail>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskDispatcher>,
        notifications: Arc<dyn NotificationBus>,
        audit: Arc<dyn AuditTrail>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            users,
            tasks,
            notifications,
            audit,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Create a new user. Exactly one record is created per unique email;
    /// a duplicate email fails with a conflict and creates nothing.
    pub async fn signup(&self, signup: NewSignup) -> Result<User, Error> {
        let password_hash = hash_password(signup.password())
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User {
            id: Uuid::new_v4(),
            name: signup.name().to_owned(),
            email: signup.email().clone(),
            role: Role::Member,
            password_hash,
            created_at: Utc::now(),
        };

        self.users
            .insert(&user)
            .await
            .map_err(map_persistence_error)?;

        if let Err(err) = self
            .tasks
            .dispatch_welcome_email(WelcomeEmailJob {
                to: user.email.clone(),
                name: user.name.clone(),
            })
            .await
        {
            warn!(error = %err, user = %user.id, "welcome email dispatch failed");
        }

        if let Err(err) = self
            .notifications
            .publish(Notification::new(
                "user.created",
                json!({ "id": user.id, "name": user.name }),
            ))
            .await
        {
            warn!(error = %err, user = %user.id, "user.created notification failed");
        }

        self.record_audit("user.signup", &user).await;

        Ok(user)
    }

    /// Verify credentials and issue a fresh identity token.
    ///
    /// Unknown email and wrong password produce the same response so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, Error> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        if !verify_password(&credentials.password, &user.password_hash) {
            return Err(Error::unauthorized("invalid credentials"));
        }

        let token = self
            .tokens
            .issue(&user.identity())
            .map_err(|err| Error::internal(err.to_string()))?;

        self.record_audit("user.login", &user).await;

        Ok(LoginOutcome { token, user })
    }

    async fn record_audit(&self, event: &str, user: &User) {
        let outcome = self
            .audit
            .record(AuditEvent {
                event: event.to_owned(),
                subject: user.id.to_string(),
                detail: json!({ "email": user.email }),
            })
            .await;
        if let Err(err) = outcome {
            warn!(error = %err, event, "audit record failed");
        }
    }
}
