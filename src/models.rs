use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP method of a saved or captured request.
///
/// Methods outside the common set are kept verbatim (uppercased) in `Other`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
    Other(String),
}

impl HttpMethod {
    /// Parse a method token. Blank or non-alphabetic tokens fall back to GET.
    pub fn parse(s: &str) -> HttpMethod {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "PUT" => HttpMethod::PUT,
            "PATCH" => HttpMethod::PATCH,
            "DELETE" => HttpMethod::DELETE,
            "HEAD" => HttpMethod::HEAD,
            "OPTIONS" => HttpMethod::OPTIONS,
            "" => HttpMethod::GET,
            _ if upper.chars().all(|c| c.is_ascii_alphabetic()) => HttpMethod::Other(upper),
            _ => HttpMethod::GET,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::Other(m) => m,
        }
    }

    /// GET and HEAD never carry a body in generated commands.
    pub fn sends_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        HttpMethod::parse(&s)
    }
}

impl From<HttpMethod> for String {
    fn from(m: HttpMethod) -> Self {
        m.as_str().to_string()
    }
}

/// How the body of a saved request is edited and sent.
///
/// Body types this crate does not model read back as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyType {
    Raw,
    FormUrlEncoded,
    #[default]
    None,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Raw => "raw",
            BodyType::FormUrlEncoded => "x-www-form-urlencoded",
            BodyType::None => "none",
        }
    }
}

impl From<String> for BodyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "raw" => BodyType::Raw,
            "x-www-form-urlencoded" => BodyType::FormUrlEncoded,
            _ => BodyType::None,
        }
    }
}

impl From<BodyType> for String {
    fn from(b: BodyType) -> Self {
        b.as_str().to_string()
    }
}

/// Key/value pair as read from a command or a capture, before it gets an id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

/// Editable key/value row (headers, query params, form fields).
///
/// Disabled rows are kept but never emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub id: String,
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            id: id.into(),
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Whether this row contributes to generated output
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// A saved, editable request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub body_raw: String,
    #[serde(default)]
    pub body_form: Vec<KeyValue>,
}

impl HttpRequest {
    /// Blank request: GET, no name, no url
    pub fn blank(id: impl Into<String>) -> Self {
        HttpRequest {
            id: id.into(),
            name: String::new(),
            method: HttpMethod::GET,
            url: String::new(),
            headers: Vec::new(),
            body_type: BodyType::None,
            body_raw: String::new(),
            body_form: Vec::new(),
        }
    }
}

/// A named folder of requests. Collections never nest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub requests: Vec<HttpRequest>,
}

impl CollectionItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CollectionItem {
            id: id.into(),
            name: name.into(),
            collapsed: false,
            requests: Vec::new(),
        }
    }
}

/// Body of a captured request: either the raw text or a structured value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapturedBody {
    Text(String),
    Structured(serde_json::Value),
}

impl CapturedBody {
    /// Textual form; structured bodies are rendered as compact JSON
    pub fn to_text(&self) -> String {
        match self {
            CapturedBody::Text(s) => s.clone(),
            CapturedBody::Structured(serde_json::Value::String(s)) => s.clone(),
            CapturedBody::Structured(v) => v.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CapturedBody::Text(s) => s.is_empty(),
            CapturedBody::Structured(serde_json::Value::Null) => true,
            CapturedBody::Structured(serde_json::Value::String(s)) => s.is_empty(),
            CapturedBody::Structured(_) => false,
        }
    }
}

/// Immutable observation of a request seen on the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedRequest {
    pub id: String,
    pub method: String,
    pub url: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub request_body: Option<CapturedBody>,
}

impl LoggedRequest {
    /// Capture time as a UTC datetime, if the timestamp is in range
    pub fn captured_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Body text when a non-empty body was captured
    pub fn body_text(&self) -> Option<String> {
        self.request_body
            .as_ref()
            .filter(|b| !b.is_empty())
            .map(CapturedBody::to_text)
    }
}

/// Initial field values for a request that does not exist in the store yet.
///
/// Produced by decoding a command or importing a capture.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RequestDraft {
    pub name: Option<String>,
    pub method: HttpMethod,
    pub url: Option<String>,
    pub headers: Vec<Header>,
    pub body_type: BodyType,
    pub body_raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("post"), HttpMethod::POST);
        assert_eq!(HttpMethod::parse(" Delete "), HttpMethod::DELETE);
        assert_eq!(HttpMethod::parse("purge"), HttpMethod::Other("PURGE".into()));
        assert_eq!(HttpMethod::parse(""), HttpMethod::GET);
        assert_eq!(HttpMethod::parse("4xx"), HttpMethod::GET);
    }

    #[test]
    fn test_sends_body() {
        assert!(!HttpMethod::GET.sends_body());
        assert!(!HttpMethod::HEAD.sends_body());
        assert!(HttpMethod::POST.sends_body());
        assert!(HttpMethod::Other("PURGE".into()).sends_body());
    }

    #[test]
    fn test_request_serializes_with_camel_case_fields() {
        let mut req = HttpRequest::blank("r1");
        req.body_type = BodyType::FormUrlEncoded;
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["bodyType"], "x-www-form-urlencoded");
        assert_eq!(json["method"], "GET");
        assert!(json.get("bodyRaw").is_some());
    }

    #[test]
    fn test_unknown_body_type_reads_as_none() {
        let json = r#"{"id":"a","name":"n","method":"put","url":"","bodyType":"form-data"}"#;
        let req: HttpRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.body_type, BodyType::None);
        assert_eq!(req.method, HttpMethod::PUT);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_captured_body_text() {
        let log: LoggedRequest = serde_json::from_str(
            r#"{"id":"l","method":"POST","url":"https://x.dev","timestamp":0,"status":201,
                "requestHeaders":{},"requestBody":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(log.body_text().as_deref(), Some(r#"{"a":1}"#));
        assert!(log.captured_at().is_some());

        let empty = LoggedRequest {
            request_body: Some(CapturedBody::Text(String::new())),
            ..log
        };
        assert_eq!(empty.body_text(), None);
    }
}
