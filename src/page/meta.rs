//! Route metadata: the small record the UI reads without loading a page.

use serde::{Deserialize, Serialize};

use super::JsonMap;

/// Metadata attached to every route entry
///
/// # Fields
///
/// | Field   | Type      | Description                              |
/// |---------|-----------|------------------------------------------|
/// | `title` | `String`  | Human-readable page title (required)     |
/// | *other* | primitive | Kept in `extra` (string/number/bool/null) |
///
/// Nested arrays or objects are rejected, keeping metadata cheap to
/// compare and to ship alongside the route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRouteMeta")]
pub struct RouteMeta {
    pub title: String,
    /// Additional primitive fields, in manifest order.
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Deserialize)]
struct RawRouteMeta {
    title: String,
    #[serde(flatten)]
    extra: JsonMap,
}

impl TryFrom<RawRouteMeta> for RouteMeta {
    type Error = String;

    fn try_from(raw: RawRouteMeta) -> Result<Self, Self::Error> {
        if let Some((key, _)) = raw
            .extra
            .iter()
            .find(|(_, value)| value.is_array() || value.is_object())
        {
            return Err(format!("meta field `{key}` must be a primitive value"));
        }
        Ok(Self {
            title: raw.title,
            extra: raw.extra,
        })
    }
}

impl RouteMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extra: JsonMap::new(),
        }
    }

    /// Add an extra primitive field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an extra field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_meta_deserialize() {
        let meta: RouteMeta = serde_json::from_str(r#"{"title": "Docs"}"#).unwrap();
        assert_eq!(meta.title, "Docs");
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_route_meta_empty_title() {
        // The not-found page ships with an empty title
        let meta: RouteMeta = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert_eq!(meta.title, "");
    }

    #[test]
    fn test_route_meta_requires_title() {
        let result = serde_json::from_str::<RouteMeta>(r#"{"order": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_route_meta_extra_fields() {
        let json = r#"{"title": "Guide", "order": 3, "draft": false, "icon": "book", "x": null}"#;
        let meta: RouteMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.get("order").and_then(|v| v.as_i64()), Some(3));
        assert_eq!(meta.get("draft").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(meta.get("icon").and_then(|v| v.as_str()), Some("book"));
        assert!(meta.get("x").is_some_and(|v| v.is_null()));
    }

    #[test]
    fn test_route_meta_rejects_nested_values() {
        let err = serde_json::from_str::<RouteMeta>(r#"{"title": "A", "tags": ["x"]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("tags"), "{err}");

        assert!(serde_json::from_str::<RouteMeta>(r#"{"title": "A", "o": {}}"#).is_err());
    }

    #[test]
    fn test_route_meta_serialize_flattens_extra() {
        let meta = RouteMeta::new("Home").with("order", 1);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"title":"Home","order":1}"#);
    }
}
