use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::CoreConfig;
use crate::error::CoreError;

use super::value::{Document, Value};

/// Client for the remote document store's REST surface.
///
/// Constructed once and handed to consumers explicitly; the bearer token is
/// attached after sign-in via [`FirestoreClient::with_token`]. No retries
/// anywhere; reconnection policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    base: String,
    project_id: String,
    token: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.firestore_base.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            token: None,
        }
    }

    /// Attach the identity token from a signed-in session.
    pub fn with_token(mut self, id_token: &str) -> Self {
        self.token = Some(id_token.to_string());
        self
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base, self.project_id
        )
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CoreError::Store {
            status: status.as_u16(),
            body: body.chars().take(300).collect(),
        })
    }

    /// Run a structured query over `collection`, ordered by `createdAt`
    /// descending, optionally bounded to `[start, end)` on `createdAt`.
    pub async fn run_query(
        &self,
        collection: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Document>, CoreError> {
        let mut query = serde_json::json!({
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": "createdAt" },
                "direction": "DESCENDING"
            }]
        });

        if let Some((start, end)) = range {
            query["where"] = serde_json::json!({
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        {
                            "fieldFilter": {
                                "field": { "fieldPath": "createdAt" },
                                "op": "GREATER_THAN_OR_EQUAL",
                                "value": Value::Timestamp(start).encode()
                            }
                        },
                        {
                            "fieldFilter": {
                                "field": { "fieldPath": "createdAt" },
                                "op": "LESS_THAN",
                                "value": Value::Timestamp(end).encode()
                            }
                        }
                    ]
                }
            });
        }

        let url = format!("{}:runQuery", self.documents_root());
        let response = self
            .apply_auth(self.http.post(&url))
            .json(&serde_json::json!({ "structuredQuery": query }))
            .send()
            .await?;
        let response = Self::check(response).await?;

        // The response is an array of result entries; entries without a
        // "document" key (read-time only markers) are skipped, as are
        // documents that fail to decode.
        let entries: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        let documents = entries
            .iter()
            .filter_map(|entry| entry.get("document"))
            .filter_map(Document::decode)
            .collect();
        Ok(documents)
    }

    /// One-shot fetch by id. A 404 is `Ok(None)`, not an error.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, CoreError> {
        let url = format!("{}/{}/{}", self.documents_root(), collection, id);
        let response = self.apply_auth(self.http.get(&url)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        Ok(Document::decode(&raw))
    }

    /// Create `collection/{id}` with the given fields.
    pub async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: &BTreeMap<String, Value>,
    ) -> Result<(), CoreError> {
        let url = format!(
            "{}/{}?documentId={}",
            self.documents_root(),
            collection,
            id
        );
        let response = self
            .apply_auth(self.http.post(&url))
            .json(&encode_fields(fields))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Patch only the named fields of `collection/{id}`, leaving the rest of
    /// the document untouched.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: &BTreeMap<String, Value>,
    ) -> Result<(), CoreError> {
        let mask = fields
            .keys()
            .map(|k| format!("updateMask.fieldPaths={k}"))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/{}/{}?{}", self.documents_root(), collection, id, mask);
        let response = self
            .apply_auth(self.http.patch(&url))
            .json(&encode_fields(fields))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

fn encode_fields(fields: &BTreeMap<String, Value>) -> serde_json::Value {
    let encoded: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), v.encode()))
        .collect();
    serde_json::json!({ "fields": encoded })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_fields_wraps_each_value() {
        let mut fields = BTreeMap::new();
        fields.insert("role".to_string(), Value::String("admin".to_string()));
        fields.insert("coin".to_string(), Value::Integer(0));

        let encoded = encode_fields(&fields);
        assert_eq!(encoded["fields"]["role"]["stringValue"], "admin");
        assert_eq!(encoded["fields"]["coin"]["integerValue"], "0");
    }
}
