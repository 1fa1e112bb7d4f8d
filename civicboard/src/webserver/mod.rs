//! HTTP surface of the application.

pub mod articles;
pub mod conversations;
pub mod health;
pub mod identity;
pub mod personas;
pub mod polls;
pub mod quizzes;
pub mod types;

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::application::Application;
use crate::seed::seed_database;

use self::types::Result;

/// Builds the full application router with CORS, panic recovery and the
/// shared application state attached.
pub fn router(application: Application) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/quizzes", get(quizzes::list_quizzes))
        .route("/quizzes/:id", get(quizzes::get_quiz))
        .route("/quizzes/:id/submit", post(quizzes::submit_quiz))
        .route("/polls", get(polls::list_polls))
        .route("/polls/:id/vote", post(polls::vote_poll))
        .route("/articles", get(articles::list_articles))
        .route("/personas", get(personas::list_personas))
        .route("/debates", post(conversations::create_debate))
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/conversations/:id",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route(
            "/conversations/:id/messages",
            post(conversations::send_message),
        );

    Router::new()
        .nest("/api", api)
        .route("/admin/seed", post(admin_seed))
        .layer(Extension(application))
        .layer(cors_layer())
        .layer(CatchPanicLayer::new())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60))
}

async fn admin_seed(Extension(app): Extension<Application>) -> Result<impl IntoResponse> {
    seed_database(&app.sql).await?;
    Ok(Json(json!({
        "ok": true,
        "message": "Database seeded successfully",
    })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use llm_client::broker::LLMBroker;
    use tower::ServiceExt;

    use crate::application::Application;

    use super::router;

    async fn test_router() -> axum::Router {
        let application = Application::initialize_for_tests(LLMBroker::new()).await;
        router(application)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn seeding_populates_the_list_endpoints() {
        let router = test_router().await;
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/seed")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/quizzes")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let quizzes = body_json(response).await;
        assert_eq!(quizzes.as_array().map(Vec::len), Some(3));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/personas")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let personas = body_json(response).await;
        assert_eq!(personas.as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn unknown_quiz_returns_not_found() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/quizzes/999")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn quiz_submission_scores_and_persists() {
        let router = test_router().await;
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/seed")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/quizzes/1/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"answers":{}}"#))
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let result = body_json(response).await;
        assert_eq!(result["matchedParty"], "Neutral");
        assert!(result["partyScores"].is_object());
        assert_eq!(result["userId"], "guest_unknown");
    }

    #[tokio::test]
    async fn sending_to_an_unknown_conversation_is_not_found() {
        let router = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/conversations/1/messages")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"content":"Hallo"}"#))
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
