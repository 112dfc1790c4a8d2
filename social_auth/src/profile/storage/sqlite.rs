use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use async_trait::async_trait;

use crate::profile::errors::ProfileError;
use crate::profile::types::SocialProfile;
use crate::provider::AccessToken;

use super::ProfileStore;

const TABLE: &str = "social_profiles";

/// SQLite-backed profile store.
///
/// The token and the extra-column map are stored as JSON text; the
/// `UNIQUE(provider, identifier)` constraint is the authoritative guard
/// against concurrent duplicate inserts.
pub struct SqliteProfileStore {
    pool: Pool<Sqlite>,
}

impl SqliteProfileStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create the profile table if it does not exist yet.
    pub async fn init(&self) -> Result<(), ProfileError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                provider TEXT NOT NULL,
                identifier TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                full_name TEXT,
                email TEXT,
                email_verified INTEGER,
                birth_date TEXT,
                gender TEXT,
                picture_url TEXT,
                extra TEXT NOT NULL,
                access_token TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                UNIQUE(provider, identifier)
            )
            "#
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| ProfileError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn find_by_provider(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Result<Option<SocialProfile>, ProfileError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT * FROM {TABLE}
            WHERE provider = ? AND identifier = ?
            "#
        ))
        .bind(provider)
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProfileError::Storage(e.to_string()))?;

        row.map(row_to_profile).transpose()
    }

    async fn save(&self, mut profile: SocialProfile) -> Result<SocialProfile, ProfileError> {
        let extra =
            serde_json::to_string(&profile.extra).map_err(|e| ProfileError::Serde(e.to_string()))?;
        let access_token = profile
            .access_token
            .to_blob()
            .map_err(|e| ProfileError::Serde(e.to_string()))?;

        match profile.id {
            None => {
                let result = sqlx::query(&format!(
                    r#"
                    INSERT INTO {TABLE}
                    (user_id, provider, identifier, first_name, last_name, full_name,
                     email, email_verified, birth_date, gender, picture_url,
                     extra, access_token, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#
                ))
                .bind(profile.user_id)
                .bind(&profile.provider)
                .bind(&profile.identifier)
                .bind(&profile.first_name)
                .bind(&profile.last_name)
                .bind(&profile.full_name)
                .bind(&profile.email)
                .bind(profile.email_verified)
                .bind(&profile.birth_date)
                .bind(&profile.gender)
                .bind(&profile.picture_url)
                .bind(&extra)
                .bind(&access_token)
                .bind(profile.created_at)
                .bind(profile.updated_at)
                .execute(&self.pool)
                .await;

                match result {
                    Ok(done) => {
                        profile.id = Some(done.last_insert_rowid());
                        Ok(profile)
                    }
                    Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                        Err(ProfileError::Duplicate {
                            provider: profile.provider,
                            identifier: profile.identifier,
                        })
                    }
                    Err(e) => Err(ProfileError::Storage(e.to_string())),
                }
            }
            Some(id) => {
                profile.updated_at = Utc::now();
                sqlx::query(&format!(
                    r#"
                    UPDATE {TABLE} SET
                        user_id = ?,
                        identifier = ?,
                        first_name = ?,
                        last_name = ?,
                        full_name = ?,
                        email = ?,
                        email_verified = ?,
                        birth_date = ?,
                        gender = ?,
                        picture_url = ?,
                        extra = ?,
                        access_token = ?,
                        updated_at = ?
                    WHERE id = ?
                    "#
                ))
                .bind(profile.user_id)
                .bind(&profile.identifier)
                .bind(&profile.first_name)
                .bind(&profile.last_name)
                .bind(&profile.full_name)
                .bind(&profile.email)
                .bind(profile.email_verified)
                .bind(&profile.birth_date)
                .bind(&profile.gender)
                .bind(&profile.picture_url)
                .bind(&extra)
                .bind(&access_token)
                .bind(profile.updated_at)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| ProfileError::Storage(e.to_string()))?;

                Ok(profile)
            }
        }
    }
}

fn row_to_profile(row: SqliteRow) -> Result<SocialProfile, ProfileError> {
    let extra: String = row
        .try_get("extra")
        .map_err(|e| ProfileError::Storage(e.to_string()))?;
    let access_token: String = row
        .try_get("access_token")
        .map_err(|e| ProfileError::Storage(e.to_string()))?;

    let get_text = |name: &str| -> Result<Option<String>, ProfileError> {
        row.try_get(name)
            .map_err(|e| ProfileError::Storage(e.to_string()))
    };

    Ok(SocialProfile {
        id: Some(
            row.try_get::<i64, _>("id")
                .map_err(|e| ProfileError::Storage(e.to_string()))?,
        ),
        user_id: row
            .try_get("user_id")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
        provider: row
            .try_get("provider")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
        identifier: row
            .try_get("identifier")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
        first_name: get_text("first_name")?,
        last_name: get_text("last_name")?,
        full_name: get_text("full_name")?,
        email: get_text("email")?,
        email_verified: row
            .try_get("email_verified")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
        birth_date: get_text("birth_date")?,
        gender: get_text("gender")?,
        picture_url: get_text("picture_url")?,
        extra: serde_json::from_str(&extra).map_err(|e| ProfileError::Serde(e.to_string()))?,
        access_token: AccessToken::from_blob(&access_token)
            .map_err(|e| ProfileError::Serde(e.to_string()))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| ProfileError::Storage(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SocialIdentity;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection keeps every query on the same in-memory database.
    async fn store() -> SqliteProfileStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteProfileStore::new(pool);
        store.init().await.unwrap();
        store
    }

    fn profile(identifier: &str) -> SocialProfile {
        let identity = SocialIdentity {
            id: identifier.to_string(),
            email: Some("ada@example.com".to_string()),
            firstname: Some("Ada".to_string()),
            email_verified: Some(true),
            ..SocialIdentity::default()
        };
        SocialProfile::new(
            "facebook",
            &identity,
            AccessToken(json!({
                "access_token": "ya29.a0AfH6",
                "scopes": ["email", "profile"]
            })),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trips_the_row() {
        // Given an initialized store
        let store = store().await;

        // When inserting a profile and reading it back by natural key
        let saved = store.save(profile("fbid")).await.unwrap();
        let found = store
            .find_by_provider("facebook", "fbid")
            .await
            .unwrap()
            .unwrap();

        // Then every column round-trips, including the opaque token blob
        assert_eq!(found.id, saved.id);
        assert_eq!(found.identifier, "fbid");
        assert_eq!(found.first_name.as_deref(), Some("Ada"));
        assert_eq!(found.email_verified, Some(true));
        assert_eq!(
            found.access_token,
            AccessToken(json!({
                "access_token": "ya29.a0AfH6",
                "scopes": ["email", "profile"]
            }))
        );
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_reported_distinctly() {
        // Given a stored profile
        let store = store().await;
        store.save(profile("fbid")).await.unwrap();

        // When a second unsaved row with the same key is inserted
        let result = store.save(profile("fbid")).await;

        // Then the unique constraint surfaces as Duplicate
        assert!(matches!(result, Err(ProfileError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_update_links_user_without_new_row() {
        // Given a stored profile
        let store = store().await;
        let mut saved = store.save(profile("fbid")).await.unwrap();

        // When linking it to a user and saving again
        saved.user_id = Some(2);
        store.save(saved).await.unwrap();

        // Then the same row now carries the link
        let found = store
            .find_by_provider("facebook", "fbid")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, Some(2));
    }

    #[tokio::test]
    async fn test_find_miss_returns_none() {
        let store = store().await;
        assert!(
            store
                .find_by_provider("facebook", "nobody")
                .await
                .unwrap()
                .is_none()
        );
    }
}
