/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, verification, login, password reset
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD plus subtasks
/// - `labels`: Label CRUD

pub mod auth;
pub mod health;
pub mod labels;
pub mod projects;
pub mod tasks;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates
///
/// Use together with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_nullable() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let cleared: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
