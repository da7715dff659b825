//! Response media type negotiation.

use axum::http::{header, HeaderMap};

/// Encodings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Json,
    Yaml,
}

impl MediaType {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }

    /// Pick the encoding for a request from its `Accept` header.
    ///
    /// Media ranges are considered in the order listed; parameters such as
    /// `q` are ignored. Anything unrecognised falls back to JSON.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|range| {
                let essence = range.split(';').next().unwrap_or("").trim();
                match essence.to_ascii_lowercase().as_str() {
                    "application/json" | "application/*" | "*/*" => Some(Self::Json),
                    "application/yaml" | "application/x-yaml" | "text/yaml" => Some(Self::Yaml),
                    _ => None,
                }
            })
            .next()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use test_case::test_case;

    #[test_case(None, MediaType::Json ; "no header")]
    #[test_case(Some("application/yaml"), MediaType::Yaml ; "yaml")]
    #[test_case(Some("application/vnd.unknown, application/yaml;q=0.9"), MediaType::Yaml ; "skips unknown")]
    #[test_case(Some("application/json, application/yaml"), MediaType::Json ; "first wins")]
    #[test_case(Some("text/html"), MediaType::Json ; "fallback")]
    #[test_case(Some("*/*"), MediaType::Json ; "wildcard")]
    fn test_negotiate(accept: Option<&'static str>, expected: MediaType) {
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
        }
        assert_eq!(MediaType::negotiate(&headers), expected);
    }
}
