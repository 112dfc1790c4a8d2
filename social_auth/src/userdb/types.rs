use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A local user account as seen by the core.
///
/// The host owns the schema, so everything beyond the primary key is an
/// open field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub fields: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mainly for hosts and fixtures.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Remove a field (the password-like field before session exposure).
    pub fn strip_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Render the value written to the session.
    ///
    /// With `entity` the record keeps its structured envelope; otherwise it
    /// flattens into a plain map with the primary key inlined as `id`.
    pub fn session_value(&self, entity: bool) -> Value {
        if entity {
            json!({ "id": self.id, "fields": self.fields })
        } else {
            let mut map = self.fields.clone();
            map.insert("id".to_string(), json!(self.id));
            Value::Object(map)
        }
    }
}
