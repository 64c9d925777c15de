//! Completed HTTP exchange as reported by the transport layer

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::resource::ResponseBody;

/// Outgoing request of one resource call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub query: HashMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Response of one resource call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Final URL, after templating and redirects
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: ResponseBody,
    pub duration: Duration,
}

impl HttpResponse {
    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("cache-control".to_string(), "max-age=60".to_string());
        let response = HttpResponse {
            status_code: 200,
            headers,
            ..Default::default()
        };

        assert_eq!(response.header("Cache-Control"), Some("max-age=60"));
        assert_eq!(response.header("ETag"), None);
    }
}
