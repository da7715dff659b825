//! Identity asserted by a trusted front proxy through request headers.

use crate::authorizer::UserInfo;
use crate::config::RequestHeaderConfig;
use axum::http::{HeaderMap, HeaderName};
use std::collections::BTreeMap;
use tracing::warn;

/// Reads the user from configured request headers.
///
/// The front proxy is not authenticated: any client that reaches the
/// server directly can claim any identity. Only enable this behind a proxy
/// that strips or overwrites these headers.
#[derive(Debug, Clone)]
pub struct RequestHeaderAuthenticator {
    username_headers: Vec<HeaderName>,
    group_headers: Vec<HeaderName>,
    extra_header_prefixes: Vec<String>,
}

impl RequestHeaderAuthenticator {
    pub fn new(config: &RequestHeaderConfig) -> Self {
        warn!(
            headers = ?config.username_headers,
            "Request-header authentication trusts identity headers from every client"
        );
        Self {
            username_headers: parse_names(&config.username_headers),
            group_headers: parse_names(&config.group_headers),
            extra_header_prefixes: config
                .extra_header_prefixes
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Extract the user and remove every identity header from `headers`.
    ///
    /// Returns `None` when no user name header is present.
    pub fn authenticate(&self, headers: &mut HeaderMap) -> Option<UserInfo> {
        let name = self
            .username_headers
            .iter()
            .filter_map(|h| headers.get(h))
            .filter_map(|v| v.to_str().ok())
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string);

        let groups: Vec<String> = self
            .group_headers
            .iter()
            .flat_map(|h| headers.get_all(h).iter())
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        let mut extra: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut extra_headers = Vec::new();
        for (header, value) in headers.iter() {
            let Some(key) = self
                .extra_header_prefixes
                .iter()
                .find_map(|prefix| header.as_str().strip_prefix(prefix.as_str()))
            else {
                continue;
            };
            extra_headers.push(header.clone());
            if key.is_empty() {
                continue;
            }
            if let Ok(value) = value.to_str() {
                extra.entry(key.to_string()).or_default().push(value.to_string());
            }
        }

        for header in self.username_headers.iter().chain(&self.group_headers) {
            headers.remove(header);
        }
        for header in &extra_headers {
            headers.remove(header);
        }

        Some(UserInfo {
            name: name?,
            uid: String::new(),
            groups,
            extra,
        })
    }
}

fn parse_names(names: &[String]) -> Vec<HeaderName> {
    names
        .iter()
        .filter_map(|name| match HeaderName::try_from(name.as_str()) {
            Ok(header) => Some(header),
            Err(_) => {
                warn!(header = %name, "Ignoring invalid identity header name");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authenticator() -> RequestHeaderAuthenticator {
        RequestHeaderAuthenticator::new(&RequestHeaderConfig {
            enabled: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_reads_and_strips_identity_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-remote-user", HeaderValue::from_static("alice"));
        headers.append("x-remote-group", HeaderValue::from_static("dev"));
        headers.append("x-remote-group", HeaderValue::from_static("ops"));
        headers.append("x-remote-extra-scopes", HeaderValue::from_static("read"));
        headers.append("x-remote-extra-scopes", HeaderValue::from_static("write"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let user = authenticator().authenticate(&mut headers).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.groups, vec!["dev".to_string(), "ops".to_string()]);
        assert_eq!(
            user.extra.get("scopes"),
            Some(&vec!["read".to_string(), "write".to_string()])
        );

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("accept"));
    }

    #[test]
    fn test_no_user_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-remote-group", HeaderValue::from_static("dev"));

        assert!(authenticator().authenticate(&mut headers).is_none());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_custom_header_names() {
        let authenticator = RequestHeaderAuthenticator::new(&RequestHeaderConfig {
            enabled: true,
            username_headers: vec!["X-Forwarded-User".into(), "X-Remote-User".into()],
            group_headers: vec![],
            extra_header_prefixes: vec![],
        });
        let mut headers = HeaderMap::new();
        headers.insert("x-remote-user", HeaderValue::from_static("bob"));

        let user = authenticator.authenticate(&mut headers).unwrap();
        assert_eq!(user.name, "bob");
        assert!(user.groups.is_empty());
    }
}
