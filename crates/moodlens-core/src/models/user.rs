use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::firestore::Document;
use crate::models::diary::resolve_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Staff,
    User,
}

impl Role {
    /// Unknown role strings fall back to the least-privileged role.
    pub fn parse(raw: &str) -> Role {
        match raw {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            "staff" => Role::Staff,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Staff => "staff",
            Role::User => "user",
        }
    }
}

/// Profile document backing a signed-in account, decoded with the same
/// lenient field handling as diaries.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub coin: i64,
    pub created_at: Option<DateTime<Local>>,
}

impl UserProfile {
    pub fn from_document(doc: &Document) -> UserProfile {
        UserProfile {
            uid: doc
                .str_field("uid")
                .unwrap_or(doc.id.as_str())
                .to_string(),
            username: doc.str_field("username").unwrap_or_default().to_string(),
            email: doc.str_field("email").unwrap_or_default().to_string(),
            role: Role::parse(doc.str_field("role").unwrap_or_default()),
            coin: doc.int_field("coin").unwrap_or(0),
            created_at: resolve_timestamp(doc.field("createdAt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::Value;
    use std::collections::BTreeMap;

    #[test]
    fn profile_decodes_with_role_fallback() {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), Value::String("nok".to_string()));
        fields.insert("email".to_string(), Value::String("nok@example.com".to_string()));
        fields.insert("role".to_string(), Value::String("superuser".to_string()));
        fields.insert(
            "createdAt".to_string(),
            Value::String("2024-01-05T10:00:00Z".to_string()),
        );
        let doc = Document {
            id: "uid-1".to_string(),
            fields,
        };

        let profile = UserProfile::from_document(&doc);
        assert_eq!(profile.uid, "uid-1");
        assert_eq!(profile.username, "nok");
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.coin, 0);
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn role_round_trips_known_names() {
        for role in [Role::Admin, Role::Moderator, Role::Staff, Role::User] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }
}
