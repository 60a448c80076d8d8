// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Two collections, both holding [`StoredWeather`] documents keyed by
//! generated ids:
//! - `history`: one document per successful lookup, read newest-first
//! - `favorites`: pinned cities, deleted individually by id

use crate::db::collections;
use crate::error::AppError;
use crate::models::StoredWeather;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct WeatherDb {
    client: Option<firestore::FirestoreDb>,
}

impl WeatherDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // Unauthenticated connection when targeting the emulator, to avoid
        // local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── History Operations ──────────────────────────────────────

    /// Insert a history entry; Firestore assigns the document id.
    ///
    /// Returns the stored document with its generated id populated.
    pub async fn add_history(&self, doc: &StoredWeather) -> Result<StoredWeather, AppError> {
        self.get_client()?
            .fluent()
            .insert()
            .into(collections::HISTORY)
            .generate_document_id()
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recent history entries, newest first.
    pub async fn recent_history(&self, limit: u32) -> Result<Vec<StoredWeather>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::HISTORY)
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all history entries. Returns the number deleted.
    ///
    /// Firestore has no native delete-many, so this queries the collection
    /// and issues concurrent single deletes with a bounded fan-out.
    pub async fn clear_history(&self) -> Result<usize, AppError> {
        let client = self.get_client()?;

        let entries: Vec<StoredWeather> = client
            .fluent()
            .select()
            .from(collections::HISTORY)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = entries.len();

        stream::iter(entries)
            .map(|entry| async move {
                let Some(id) = entry.id else {
                    return Ok(());
                };

                client
                    .fluent()
                    .delete()
                    .from(collections::HISTORY)
                    .document_id(&id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::info!(count, "History cleared");

        Ok(count)
    }

    // ─── Favorite Operations ─────────────────────────────────────

    /// Get all favorite entries.
    pub async fn list_favorites(&self) -> Result<Vec<StoredWeather>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FAVORITES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a favorite by exact city name (case-sensitive, no normalization).
    pub async fn find_favorite_by_city(
        &self,
        city: &str,
    ) -> Result<Option<StoredWeather>, AppError> {
        let matches: Vec<StoredWeather> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FAVORITES)
            .filter(|q| q.for_all([q.field("city").eq(city)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Get a favorite by document id.
    pub async fn get_favorite(&self, id: &str) -> Result<Option<StoredWeather>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FAVORITES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a favorite; Firestore assigns the document id.
    ///
    /// No uniqueness constraint is enforced here: callers check for an
    /// existing city first, and concurrent adds may race past that check.
    pub async fn add_favorite(&self, doc: &StoredWeather) -> Result<StoredWeather, AppError> {
        self.get_client()?
            .fluent()
            .insert()
            .into(collections::FAVORITES)
            .generate_document_id()
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a favorite by document id.
    pub async fn delete_favorite(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::FAVORITES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
