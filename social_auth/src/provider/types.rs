use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque provider token.
///
/// The shape is entirely provider-specific (a bare string, a map with
/// refresh/expiry fields, whatever the protocol library hands back), so it is
/// kept as raw JSON and serialized reversibly for storage: a stored token
/// deserializes to a value usable exactly like the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub Value);

impl AccessToken {
    /// Convenience constructor for plain bearer-string tokens.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Value::String(token.into()))
    }

    /// Serialize for storage.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Deserialize a stored blob back into a token.
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::from_str(blob)?))
    }
}

/// Identity as returned by a provider, read-only for one handshake.
///
/// Field names follow the provider-side vocabulary (`firstname`,
/// `emailVerified`, `pictureURL`); the rename to profile columns happens in
/// [`crate::SocialProfile::apply_identity`]. Anything the provider returns
/// beyond the known fields lands in `extra` and is mirrored onto a
/// same-named profile column.
///
/// An empty `id` means the provider failed to identify the user and is
/// treated as a provider failure by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(
        default,
        rename = "emailVerified",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, rename = "pictureURL", skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_identity_deserializes_provider_field_names() {
        // Given a raw identity payload in provider vocabulary
        let payload = json!({
            "id": "9837049",
            "firstname": "Ada",
            "lastname": "Lovelace",
            "fullname": "Ada Lovelace",
            "email": "ada@example.com",
            "emailVerified": true,
            "sex": "female",
            "pictureURL": "https://img.example.com/ada.png",
            "locale": "en_GB"
        });

        // When deserializing it
        let identity: SocialIdentity = serde_json::from_value(payload).unwrap();

        // Then known fields land on typed members and the rest in extra
        assert_eq!(identity.id, "9837049");
        assert_eq!(identity.firstname.as_deref(), Some("Ada"));
        assert_eq!(identity.email_verified, Some(true));
        assert_eq!(
            identity.picture_url.as_deref(),
            Some("https://img.example.com/ada.png")
        );
        assert_eq!(identity.extra.get("locale"), Some(&json!("en_GB")));
    }

    #[test]
    fn test_identity_missing_id_becomes_empty() {
        // A payload without an id must still deserialize; the orchestrator
        // classifies the empty id as a provider failure.
        let identity: SocialIdentity =
            serde_json::from_value(json!({ "email": "x@example.com" })).unwrap();
        assert!(identity.id.is_empty());
    }

    #[test]
    fn test_access_token_blob_round_trip_nested() {
        // Given a representative complex token structure
        let token = AccessToken(json!({
            "access_token": "ya29.a0AfH6",
            "refresh_token": "1//0gLurv",
            "expires_in": 3599,
            "scopes": ["email", "profile"],
            "extra": { "token_type": "Bearer" }
        }));

        // When serializing and deserializing it
        let blob = token.to_blob().unwrap();
        let restored = AccessToken::from_blob(&blob).unwrap();

        // Then the restored token is identical to the original
        assert_eq!(restored, token);
    }

    proptest! {
        /// Any token built from string and array fields must round-trip
        /// exactly through the storage blob form.
        #[test]
        fn test_access_token_blob_round_trip(
            entries in proptest::collection::btree_map(
                "[a-z_]{1,12}",
                prop_oneof![
                    "[ -~]{0,32}".prop_map(Value::String),
                    proptest::collection::vec("[ -~]{0,16}", 0..4)
                        .prop_map(|v| Value::Array(v.into_iter().map(Value::String).collect())),
                ],
                0..6,
            )
        ) {
            let token = AccessToken(Value::Object(entries.into_iter().collect()));

            let blob = token.to_blob().unwrap();
            let restored = AccessToken::from_blob(&blob).unwrap();

            prop_assert_eq!(restored, token);
        }
    }
}
