//! Ordered composition of authorizers.

use super::{AttributesRecord, Authorizer, AuthorizerContext, AuthorizerResponse, Decision};
use async_trait::async_trait;
use std::sync::Arc;

/// Asks each authorizer in turn.
///
/// The first `Allow` or `Deny` is returned as is. If every authorizer
/// has no opinion, the result is `NoOpinion` with all non-empty reasons
/// joined by newlines and all errors folded into one.
#[derive(Clone, Default)]
pub struct UnionAuthorizer {
    authorizers: Vec<Arc<dyn Authorizer>>,
}

impl UnionAuthorizer {
    pub fn new(authorizers: Vec<Arc<dyn Authorizer>>) -> Self {
        Self { authorizers }
    }

    pub fn len(&self) -> usize {
        self.authorizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }
}

#[async_trait]
impl Authorizer for UnionAuthorizer {
    async fn authorize(
        &self,
        ctx: &AuthorizerContext<'_>,
        attributes: &AttributesRecord,
    ) -> AuthorizerResponse {
        let mut reasons = Vec::new();
        let mut errors = Vec::new();

        for authorizer in &self.authorizers {
            let response = authorizer.authorize(ctx, attributes).await;
            match response.decision {
                Decision::Allow | Decision::Deny => return response,
                Decision::NoOpinion => {
                    if !response.reason.is_empty() {
                        reasons.push(response.reason);
                    }
                    if let Some(err) = response.error {
                        errors.push(err);
                    }
                }
            }
        }

        let response = AuthorizerResponse::no_opinion(reasons.join("\n"));
        match aggregate(errors) {
            Some(err) => response.with_error(err),
            None => response,
        }
    }
}

fn aggregate(mut errors: Vec<anyhow::Error>) -> Option<anyhow::Error> {
    match errors.len() {
        0 => None,
        1 => errors.pop(),
        _ => {
            let messages: Vec<String> = errors.iter().map(|e| format!("{:#}", e)).collect();
            Some(anyhow::anyhow!("[{}]", messages.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Extensions;

    struct Fixed(Decision, &'static str, Option<&'static str>);

    #[async_trait]
    impl Authorizer for Fixed {
        async fn authorize(
            &self,
            _ctx: &AuthorizerContext<'_>,
            _attributes: &AttributesRecord,
        ) -> AuthorizerResponse {
            let response = AuthorizerResponse::new(self.0, self.1);
            match self.2 {
                Some(msg) => response.with_error(anyhow::anyhow!(msg)),
                None => response,
            }
        }
    }

    async fn run(union: UnionAuthorizer) -> AuthorizerResponse {
        let extensions = Extensions::new();
        union
            .authorize(&AuthorizerContext::new(&extensions), &AttributesRecord::default())
            .await
    }

    #[tokio::test]
    async fn test_first_definite_decision_wins() {
        let union = UnionAuthorizer::new(vec![
            Arc::new(Fixed(Decision::NoOpinion, "skip", Some("lookup failed"))),
            Arc::new(Fixed(Decision::Deny, "denied by policy", None)),
            Arc::new(Fixed(Decision::Allow, "never reached", None)),
        ]);

        let response = run(union).await;
        assert_eq!(response.decision, Decision::Deny);
        assert_eq!(response.reason, "denied by policy");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_all_no_opinion_aggregates() {
        let union = UnionAuthorizer::new(vec![
            Arc::new(Fixed(Decision::NoOpinion, "first", Some("a"))),
            Arc::new(Fixed(Decision::NoOpinion, "", None)),
            Arc::new(Fixed(Decision::NoOpinion, "third", Some("b"))),
        ]);

        let response = run(union).await;
        assert_eq!(response.decision, Decision::NoOpinion);
        assert_eq!(response.reason, "first\nthird");
        assert_eq!(response.error.unwrap().to_string(), "[a, b]");
    }

    #[tokio::test]
    async fn test_single_error_is_kept() {
        let union = UnionAuthorizer::new(vec![Arc::new(Fixed(
            Decision::NoOpinion,
            "",
            Some("webhook unreachable"),
        ))]);

        let response = run(union).await;
        assert_eq!(response.error.unwrap().to_string(), "webhook unreachable");
    }

    #[tokio::test]
    async fn test_empty_union_has_no_opinion() {
        let response = run(UnionAuthorizer::default()).await;
        assert_eq!(response.decision, Decision::NoOpinion);
        assert!(response.reason.is_empty());
        assert!(response.error.is_none());
    }
}
