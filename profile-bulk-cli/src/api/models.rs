//! Wire types for the directory and profile services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Response code of a successful call
pub const RESPONSE_OK: &str = "OK";

/// Attributes requested from the directory for every lookup
pub const SEARCH_FIELDS: [&str; 6] = ["userId", "status", "channel", "rootOrgId", "phone", "email"];

/// `{"request": {...}}` envelope shared by both services
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub request: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub filters: Map<String, JsonValue>,
    pub fields: Vec<String>,
}

impl SearchRequest {
    /// Filter on a single attribute with the standard projection
    pub fn by(field: &str, value: &str) -> Envelope<SearchRequest> {
        let mut filters = Map::new();
        filters.insert(field.to_string(), JsonValue::String(value.to_string()));
        Envelope {
            request: SearchRequest {
                filters,
                fields: SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "responseCode", default)]
    pub response_code: String,
    #[serde(default)]
    pub result: Option<SearchResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub response: Option<SearchPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub content: Vec<UserRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "rootOrgId", default)]
    pub root_org_id: Option<String>,
    /// Department name
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub status: Option<JsonValue>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SearchResponse {
    pub fn is_ok(&self) -> bool {
        self.response_code.eq_ignore_ascii_case(RESPONSE_OK)
    }

    /// Matched users, empty when the page is missing
    pub fn content(&self) -> &[UserRecord] {
        self.result
            .as_ref()
            .and_then(|r| r.response.as_ref())
            .map(|p| p.content.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "profileDetails")]
    pub profile_details: JsonValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errmsg: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(rename = "responseCode", default)]
    pub response_code: String,
    #[serde(default)]
    pub params: Option<ResponseParams>,
}

impl ProfileUpdateResponse {
    pub fn accepted() -> Self {
        ProfileUpdateResponse {
            response_code: RESPONSE_OK.to_string(),
            params: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.response_code.eq_ignore_ascii_case(RESPONSE_OK)
    }

    /// Best available reason for a rejection
    pub fn error_message(&self) -> String {
        self.params
            .as_ref()
            .and_then(|p| p.errmsg.clone())
            .unwrap_or_else(|| format!("responseCode {}", self.response_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_shape() {
        let body = serde_json::to_value(SearchRequest::by("email", "a@b.in")).unwrap();
        assert_eq!(
            body,
            json!({
                "request": {
                    "filters": { "email": "a@b.in" },
                    "fields": ["userId", "status", "channel", "rootOrgId", "phone", "email"]
                }
            })
        );
    }

    #[test]
    fn test_search_response_parsing() {
        let response: SearchResponse = serde_json::from_value(json!({
            "responseCode": "OK",
            "result": { "response": { "count": 1, "content": [
                { "userId": "u-1", "rootOrgId": "org-1", "channel": "Revenue", "status": 1 }
            ]}}
        }))
        .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.content().len(), 1);
        assert_eq!(response.content()[0].user_id.as_deref(), Some("u-1"));

        let empty: SearchResponse = serde_json::from_value(json!({ "responseCode": "OK" })).unwrap();
        assert!(empty.content().is_empty());
    }

    #[test]
    fn test_profile_update_response() {
        let rejected: ProfileUpdateResponse = serde_json::from_value(json!({
            "responseCode": "CLIENT_ERROR",
            "params": { "status": "FAILED", "errmsg": "Invalid dob" }
        }))
        .unwrap();
        assert!(!rejected.is_ok());
        assert_eq!(rejected.error_message(), "Invalid dob");
        assert!(ProfileUpdateResponse::accepted().is_ok());
    }
}
