//! Path-based request classification.
//!
//! Resource URLs have the shapes
//!
//! ```text
//! /api/{version}/{resource}
//! /api/{version}/{resource}/{name}
//! /api/{version}/{resource}/{name}/{subresource}
//! /api/{version}/namespaces/{namespace}/{resource}/...
//! /apis/{group}/{version}/...
//! /apis/{group}/{version}/watch/{resource}
//! ```
//!
//! Anything else is a non-resource request.

use super::types::{RequestInfo, RequestInfoError};
use axum::http::Method;
use std::collections::HashSet;

const SPECIAL_VERBS: [&str; 2] = ["proxy", "watch"];
const SPECIAL_VERBS_NO_SUBRESOURCES: [&str; 1] = ["proxy"];
const NAMESPACE_SUBRESOURCES: [&str; 2] = ["status", "finalize"];

/// Builds [`RequestInfo`] from request coordinates.
#[derive(Debug, Clone)]
pub struct RequestInfoResolver {
    api_prefixes: HashSet<String>,
    groupless_api_prefixes: HashSet<String>,
}

impl Default for RequestInfoResolver {
    fn default() -> Self {
        Self::new(["api", "apis"], ["api"])
    }
}

impl RequestInfoResolver {
    pub fn new<I, J, S, T>(api_prefixes: I, groupless_api_prefixes: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            api_prefixes: api_prefixes.into_iter().map(Into::into).collect(),
            groupless_api_prefixes: groupless_api_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a request.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<RequestInfo, RequestInfoError> {
        let non_resource = RequestInfo::non_resource(path, method.as_str().to_lowercase());

        let mut parts = split_path(path);
        if parts.len() < 3 || !self.api_prefixes.contains(parts[0]) {
            return Ok(non_resource);
        }

        let mut info = non_resource;
        info.api_prefix = parts[0].to_string();
        parts.remove(0);

        if !self.groupless_api_prefixes.contains(&info.api_prefix) {
            // group, version and resource
            if parts.len() < 3 {
                return Ok(info);
            }
            info.api_group = parts.remove(0).to_string();
        }

        info.is_resource_request = true;
        info.api_version = parts.remove(0).to_string();

        if SPECIAL_VERBS.contains(&parts[0]) {
            if parts.len() < 2 {
                return Err(RequestInfoError::MissingResource(path.to_string()));
            }
            info.verb = parts.remove(0).to_string();
        } else {
            info.verb = verb_for_method(method).to_string();
        }

        if parts[0] == "namespaces" && parts.len() > 1 {
            info.namespace = parts[1].to_string();
            // a further segment that is not a namespace subresource is a
            // resource in its own right
            if parts.len() > 2 && !NAMESPACE_SUBRESOURCES.contains(&parts[2]) {
                parts = parts.split_off(2);
            }
        }

        info.parts = parts.iter().map(|p| p.to_string()).collect();

        if info.parts.len() >= 3 && !SPECIAL_VERBS_NO_SUBRESOURCES.contains(&info.verb.as_str()) {
            info.subresource = info.parts[2].clone();
        }
        if info.parts.len() >= 2 {
            info.name = info.parts[1].clone();
        }
        if let Some(resource) = info.parts.first() {
            info.resource = resource.clone();
        }

        if info.name.is_empty() && info.verb == "get" {
            let options = ListOptions::from_query(query);
            info.verb = if options.watch { "watch" } else { "list" }.to_string();
            if let Some(name) = options.field_selector_name() {
                info.name = name;
            }
        }

        if info.name.is_empty() && info.verb == "delete" {
            info.verb = "deletecollection".to_string();
        }

        Ok(info)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

fn verb_for_method(method: &Method) -> &'static str {
    match *method {
        Method::POST => "create",
        Method::GET | Method::HEAD => "get",
        Method::PUT => "update",
        Method::PATCH => "patch",
        Method::DELETE => "delete",
        _ => "",
    }
}

/// The list-related query parameters.
#[derive(Debug, Default)]
struct ListOptions {
    watch: bool,
    field_selector: Option<String>,
}

impl ListOptions {
    fn from_query(query: Option<&str>) -> Self {
        let mut options = Self::default();
        let Some(query) = query else {
            return options;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "watch" => options.watch = matches!(value.as_ref(), "true" | "1"),
                "fieldSelector" => options.field_selector = Some(value.into_owned()),
                _ => {}
            }
        }
        options
    }

    /// Name required by an exact `metadata.name` field selector.
    fn field_selector_name(&self) -> Option<String> {
        let selector = self.field_selector.as_deref()?;
        selector.split(',').find_map(|term| {
            let (field, value) = term
                .split_once("==")
                .or_else(|| term.split_once('='))?;
            if field.trim() != "metadata.name" || value.starts_with('=') {
                return None;
            }
            let value = value.trim();
            is_valid_path_segment(value).then(|| value.to_string())
        })
    }
}

fn is_valid_path_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '%'])
}
