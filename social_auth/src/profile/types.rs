use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provider::{AccessToken, SocialIdentity};

/// Persisted mirror of one provider identity.
///
/// At most one profile exists per `(provider, identifier)` pair; the store
/// enforces that. `user_id` stays `None` until the first successful
/// reconciliation links the profile to a local user, and the orchestrator
/// never rewrites an existing link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    /// Surrogate key, assigned by the store on insert.
    pub id: Option<i64>,
    /// Linked local user, set exactly once at first reconciliation.
    pub user_id: Option<i64>,
    pub provider: String,
    /// External identifier assigned by the provider.
    pub identifier: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub picture_url: Option<String>,
    /// Provider fields with no dedicated column, mirrored same-named.
    pub extra: BTreeMap<String, Value>,
    pub access_token: AccessToken,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialProfile {
    /// Build a fresh, unlinked profile from a provider identity.
    pub fn new(provider: &str, identity: &SocialIdentity, access_token: AccessToken) -> Self {
        let now = Utc::now();
        let mut profile = Self {
            id: None,
            user_id: None,
            provider: provider.to_string(),
            identifier: String::new(),
            first_name: None,
            last_name: None,
            full_name: None,
            email: None,
            email_verified: None,
            birth_date: None,
            gender: None,
            picture_url: None,
            extra: BTreeMap::new(),
            access_token: AccessToken::default(),
            created_at: now,
            updated_at: now,
        };
        profile.apply_identity(identity, access_token);
        profile
    }

    /// Refresh mirrored columns and the token from the latest identity.
    ///
    /// The identity-to-column rename table lives here: `id` becomes
    /// `identifier`, `firstname`/`lastname`/`fullname` their snake_case
    /// column names, `birthday` becomes `birth_date`, `emailVerified`
    /// `email_verified`, `sex` `gender` and `pictureURL` `picture_url`.
    /// Everything else keeps its name in `extra`. Runs on every login so
    /// the profile never goes stale relative to the provider.
    pub fn apply_identity(&mut self, identity: &SocialIdentity, access_token: AccessToken) {
        self.identifier = identity.id.clone();
        self.first_name = identity.firstname.clone();
        self.last_name = identity.lastname.clone();
        self.full_name = identity.fullname.clone();
        self.email = identity.email.clone();
        self.email_verified = identity.email_verified;
        self.birth_date = identity.birthday.clone();
        self.gender = identity.sex.clone();
        self.picture_url = identity.picture_url.clone();
        for (key, value) in &identity.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self.access_token = access_token;
    }
}
