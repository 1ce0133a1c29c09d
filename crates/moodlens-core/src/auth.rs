use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::firestore::{FirestoreClient, Value};
use crate::models::user::{Role, UserProfile};

pub const USERS_COLLECTION: &str = "users";

/// A signed-in admin session. Holds the bearer token the document store
/// client needs; dropping it is sign-out (there is no server-side call).
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub id_token: String,
}

/// Password sign-in against the identity service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl AuthClient {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.identity_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CoreError> {
        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.base, self.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "email": email.trim(),
                "password": password,
                "returnSecureToken": true
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("sign-in transport failure: {e}");
                CoreError::Auth {
                    code: "network".to_string(),
                    message: "Login failed".to_string(),
                }
            })?;

        if !response.status().is_success() {
            let code = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_default();
            return Err(CoreError::Auth {
                message: friendly_auth_message(&code),
                code,
            });
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        Ok(Session {
            uid: body.local_id,
            email: body.email.unwrap_or_else(|| email.trim().to_string()),
            id_token: body.id_token,
        })
    }
}

/// Map an identity-service error code to a short message the login form can
/// show. Unknown codes degrade to a cleaned-up form of the code itself;
/// anything is recoverable by user retry.
pub fn friendly_auth_message(code: &str) -> String {
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Invalid email or password".to_string()
        }
        "USER_DISABLED" => "This account has been disabled".to_string(),
        "" => "Login failed".to_string(),
        other => other.to_lowercase().replace('_', " "),
    }
}

/// Make sure `users/{uid}` exists for a fresh session.
///
/// First login creates the profile with role `admin` (this deployment is
/// admin-only); an existing profile that was demoted to `user` is promoted
/// back. Other roles are left alone.
pub async fn ensure_profile(
    store: &FirestoreClient,
    session: &Session,
) -> Result<UserProfile, CoreError> {
    if let Some(doc) = store.get_document(USERS_COLLECTION, &session.uid).await? {
        let mut profile = UserProfile::from_document(&doc);
        if profile.role == Role::User {
            let mut patch = BTreeMap::new();
            patch.insert(
                "role".to_string(),
                Value::String(Role::Admin.as_str().to_string()),
            );
            store
                .patch_document(USERS_COLLECTION, &session.uid, &patch)
                .await?;
            profile.role = Role::Admin;
        }
        return Ok(profile);
    }

    let username = session
        .email
        .split('@')
        .next()
        .unwrap_or("")
        .to_string();
    let created_at = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let mut fields = BTreeMap::new();
    fields.insert("uid".to_string(), Value::String(session.uid.clone()));
    fields.insert("username".to_string(), Value::String(username.clone()));
    fields.insert("email".to_string(), Value::String(session.email.clone()));
    fields.insert(
        "role".to_string(),
        Value::String(Role::Admin.as_str().to_string()),
    );
    fields.insert("coin".to_string(), Value::Integer(0));
    fields.insert("createdAt".to_string(), Value::String(created_at.clone()));
    store
        .create_document(USERS_COLLECTION, &session.uid, &fields)
        .await?;

    Ok(UserProfile {
        uid: session.uid.clone(),
        username,
        email: session.email.clone(),
        role: Role::Admin,
        coin: 0,
        created_at: crate::models::diary::resolve_timestamp(Some(&Value::String(created_at))),
    })
}
