use axum::http::HeaderMap;

/// The transport collaborator authenticates callers and forwards the verified
/// identity in this header; the core trusts it for every ownership check.
pub const OWNER_HEADER: &str = "x-user-id";

pub fn owner_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extracts_owner() {
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_static("user-42"));

        assert_eq!(owner_from_headers(&headers), Some("user-42".to_string()));
    }

    #[test]
    fn test_missing_or_blank_header_is_none() {
        assert_eq!(owner_from_headers(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_static("   "));
        assert_eq!(owner_from_headers(&headers), None);
    }
}
