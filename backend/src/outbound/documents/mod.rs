//! MongoDB document-store adapter for the audit trail.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{AuditError, AuditEvent, AuditTrail};

const AUDIT_COLLECTION: &str = "audit_events";

#[cfg(not(test))]
const SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
#[cfg(test)]
const SELECTION_TIMEOUT: Duration = Duration::from_millis(200);

/// Errors raised while connecting to the document store.
#[derive(Debug, thiserror::Error)]
#[error("document store connection failed: {message}")]
pub struct DocumentStoreError {
    pub message: String,
}

impl DocumentStoreError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stored shape of one audit event.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditDocument {
    event: String,
    subject: String,
    detail: Value,
    recorded_at: DateTime<Utc>,
}

/// Append-only audit trail in a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoAuditTrail {
    collection: Collection<AuditDocument>,
}

impl MongoAuditTrail {
    /// Connect to the document store and bind the audit collection.
    ///
    /// The driver defers connections until the first operation, so the store
    /// is pinged here: a configured-but-unreachable URL aborts assembly
    /// instead of silently dropping every audit write.
    pub async fn connect(url: &str, database: &str) -> Result<Self, DocumentStoreError> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|err| DocumentStoreError::new(err.to_string()))?;
        options.server_selection_timeout = Some(SELECTION_TIMEOUT);
        let client =
            Client::with_options(options).map_err(|err| DocumentStoreError::new(err.to_string()))?;
        let database = client.database(database);
        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|err| DocumentStoreError::new(err.to_string()))?;
        let collection = database.collection(AUDIT_COLLECTION);
        Ok(Self { collection })
    }
}

#[async_trait]
impl AuditTrail for MongoAuditTrail {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let document = AuditDocument {
            event: event.event,
            subject: event.subject,
            detail: event.detail,
            recorded_at: Utc::now(),
        };
        self.collection
            .insert_one(document, None)
            .await
            .map_err(|err| AuditError::new(err.to_string()))?;
        Ok(())
    }
}
