use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::authz::authorizer::Authorizer;
use crate::authz::types::{AuthorizeRequest, AuthorizeResponse, LevelRequest, PoliciesResponse};

pub fn router(authorizer: Authorizer) -> Router {
    Router::new()
        .route("/v1/authorize", post(handle_authorize))
        .route("/v1/authorize/level", post(handle_level))
        .route("/v1/policies", get(handle_policies))
        .route("/healthz", get(health))
        .with_state(authorizer)
}

async fn handle_authorize(
    State(authorizer): State<Authorizer>,
    Json(req): Json<AuthorizeRequest>,
) -> impl IntoResponse {
    match authorizer.authorize_named(&req.principal, &req.policy) {
        Ok(decision) => Json(AuthorizeResponse::from_decision(&req.policy, &decision)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_level(
    State(authorizer): State<Authorizer>,
    Json(req): Json<LevelRequest>,
) -> impl IntoResponse {
    match authorizer.require_level(&req.principal, req.level) {
        Ok((policy, decision)) => {
            Json(AuthorizeResponse::from_decision(&policy.name, &decision)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn handle_policies(State(authorizer): State<Authorizer>) -> impl IntoResponse {
    Json(PoliciesResponse {
        policies: authorizer.provider().registry().names(),
    })
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::provider::{DynamicPolicyOptions, PolicyProvider, PolicyRegistry};
    use crate::authz::types::{Policy, Requirement};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let registry = PolicyRegistry::from_policies(vec![Policy::new(
            "Admin",
            vec![Requirement::HasRole("Admin".into())],
        )])
        .unwrap();
        let provider = PolicyProvider::new(registry, DynamicPolicyOptions::default()).unwrap();
        router(Authorizer::new(Arc::new(provider)))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn level_seven() -> Value {
        json!({
            "identities": [
                { "label": "Grandma", "claims": [
                    { "type": "role", "value": "Admin" },
                    { "type": "SecurityLevel", "value": "7" }
                ] }
            ]
        })
    }

    #[tokio::test]
    async fn test_authorize_allow() {
        let resp = app()
            .oneshot(post_json(
                "/v1/authorize",
                json!({ "principal": level_seven(), "policy": "Level5" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["allowed"], true);
        assert_eq!(body["failed"], json!([]));
    }

    #[tokio::test]
    async fn test_authorize_deny_lists_failures() {
        let resp = app()
            .oneshot(post_json(
                "/v1/authorize/level",
                json!({ "principal": level_seven(), "level": 10 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["policy"], "Level10");
        assert_eq!(body["failed"], json!(["claim \"SecurityLevel\" >= 10"]));
    }

    #[tokio::test]
    async fn test_authorize_unknown_policy_is_404() {
        for policy in ["LevelXYZ", "Nope"] {
            let resp = app()
                .oneshot(post_json(
                    "/v1/authorize",
                    json!({ "principal": level_seven(), "policy": policy }),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body = body_json(resp).await;
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_missing_principal_is_anonymous() {
        let resp = app()
            .oneshot(post_json("/v1/authorize", json!({ "policy": "Admin" })))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["allowed"], false);
    }

    #[tokio::test]
    async fn test_list_policies_and_health() {
        let resp = app()
            .oneshot(Request::get("/v1/policies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["policies"], json!(["Admin"]));

        let resp = app()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
