//! Query string and url display helpers

use crate::ids::IdAllocator;
use crate::models::KeyValue;

/// Encode enabled, keyed rows as `k=v&k2=v2`
pub fn params_to_query_string(params: &[KeyValue]) -> String {
    params
        .iter()
        .filter(|p| p.is_active())
        .map(|p| format!("{}={}", urlencoding::encode(&p.key), urlencoding::encode(&p.value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Split a query string into enabled rows with fresh ids
pub fn query_string_to_params(query: &str, ids: &mut IdAllocator) -> Vec<KeyValue> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }
    query
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            KeyValue::new(ids.next_id(), decode(key), decode(value))
        })
        .collect()
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Split a url into its origin and its path plus query, for list display.
///
/// Unparsable urls come back whole as the origin with an empty path.
pub fn split_url(raw: &str) -> (String, String) {
    match url::Url::parse(raw) {
        Ok(parsed) if parsed.has_host() => {
            let mut path = parsed.path().to_string();
            if let Some(q) = parsed.query() {
                path.push('?');
                path.push_str(q);
            }
            (parsed.origin().ascii_serialization(), path)
        }
        _ => (raw.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_query_string() {
        let params = vec![
            KeyValue::new("1", "q", "rust lang"),
            KeyValue { enabled: false, ..KeyValue::new("2", "off", "x") },
            KeyValue::new("3", "", "no key"),
            KeyValue::new("4", "a&b", "="),
        ];
        assert_eq!(params_to_query_string(&params), "q=rust%20lang&a%26b=%3D");
    }

    #[test]
    fn test_query_string_to_params() {
        let mut ids = IdAllocator::with_prefix("q");
        let params = query_string_to_params("?q=rust%20lang&flag&x=a=b", &mut ids);
        let pairs: Vec<_> = params.iter().map(|p| (p.key.as_str(), p.value.as_str())).collect();
        assert_eq!(pairs, vec![("q", "rust lang"), ("flag", ""), ("x", "a=b")]);
        assert!(params.iter().all(|p| p.enabled));
        assert_ne!(params[0].id, params[1].id);

        assert!(query_string_to_params("", &mut ids).is_empty());
    }

    #[test]
    fn test_split_url() {
        assert_eq!(
            split_url("https://api.example.com:8443/v1/users?page=2"),
            ("https://api.example.com:8443".to_string(), "/v1/users?page=2".to_string())
        );
        assert_eq!(split_url("not a url"), ("not a url".to_string(), String::new()));
    }
}
