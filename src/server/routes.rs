//! HTTP routes
//!
//! - `GET /`: chat page; `?reset=1` clears the session's throttle state
//! - `POST /`: ask a question (form or JSON body with a `question` field)
//! - `GET /health`: configured providers

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Query, Request, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::AppState;
use super::page::render_page;
use super::session::ClientSession;
use crate::constants::server::{
    EMPTY_QUESTION_MESSAGE, INTERNAL_ERROR_MESSAGE, NO_PROVIDERS_MESSAGE, THROTTLED_MESSAGE,
};
use crate::orchestrator::Reply;
use crate::types::GuideError;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Page Routes
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(index).post(ask))
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    reset: Option<String>,
}

async fn index(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    let session = ClientSession::from_headers(&headers);

    let response = if params.reset.as_deref().is_some_and(|flag| !flag.is_empty()) {
        state.orchestrator.reset_session(&session.id);
        Redirect::to("/").into_response()
    } else {
        Html(render_page()).into_response()
    };

    session.apply(response)
}

#[derive(Debug, Default, Deserialize)]
struct QuestionPayload {
    #[serde(default)]
    question: Option<String>,
}

/// JSON reply body shared by every `POST /` outcome
#[derive(Debug, Serialize)]
struct AskBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    throttled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl AskBody {
    fn answered(text: String, source: String) -> Self {
        Self {
            success: true,
            response: Some(text),
            source: Some(source),
            throttled: false,
            message: None,
        }
    }

    fn throttled() -> Self {
        Self {
            success: true,
            response: Some(THROTTLED_MESSAGE.to_string()),
            source: None,
            throttled: true,
            message: None,
        }
    }

    fn failure(message: &str) -> Self {
        Self {
            success: false,
            response: None,
            source: None,
            throttled: false,
            message: Some(message.to_string()),
        }
    }
}

async fn ask(State(state): State<AppStateArc>, request: Request) -> Response {
    let session = ClientSession::from_headers(request.headers());
    let question = read_question(request, &state).await;

    let result = state
        .orchestrator
        .handle(&session.id, question.as_deref(), Utc::now())
        .await;

    let response = match result {
        // The telemetry handle is dropped here; delivery keeps running detached
        Ok(Reply::Answered(reply)) => (
            StatusCode::OK,
            Json(AskBody::answered(
                reply.answer.text,
                reply.answer.source.to_string(),
            )),
        )
            .into_response(),
        Ok(Reply::Throttled { .. }) => (StatusCode::OK, Json(AskBody::throttled())).into_response(),
        Err(e) => error_response(&e),
    };

    session.apply(response)
}

/// Extract `question` from a JSON or form body. Unreadable bodies count as missing.
async fn read_question(request: Request, state: &AppStateArc) -> Option<String> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let payload = if is_json {
        Json::<QuestionPayload>::from_request(request, state)
            .await
            .map(|Json(payload)| payload)
            .map_err(|rejection| rejection.body_text())
    } else {
        Form::<QuestionPayload>::from_request(request, state)
            .await
            .map(|Form(payload)| payload)
            .map_err(|rejection| rejection.body_text())
    };

    match payload {
        Ok(payload) => payload.question,
        Err(reason) => {
            debug!(%reason, "Unreadable question payload");
            None
        }
    }
}

fn error_response(err: &GuideError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = match err {
        input if input.is_input_error() => {
            debug!(error = %input, "Question rejected");
            EMPTY_QUESTION_MESSAGE
        }
        GuideError::NoProviders => {
            warn!("Question refused: no provider configured");
            NO_PROVIDERS_MESSAGE
        }
        other => {
            error!(error = %other, "Unexpected error while answering");
            INTERNAL_ERROR_MESSAGE
        }
    };

    (status, Json(AskBody::failure(message))).into_response()
}

/// Uncaught handler panic: generic 500, detail to the log only
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Handler panicked while answering");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(AskBody::failure(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    providers: Vec<String>,
    uptime_secs: u64,
}

async fn health(State(state): State<AppStateArc>) -> (StatusCode, Json<HealthBody>) {
    let providers = state.orchestrator.chain().provider_ids();
    let (status, label) = if providers.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status,
        Json(HealthBody {
            status: label,
            providers,
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ProviderChainBuilder, TextProvider};
    use crate::analyzer::RankExtractor;
    use crate::orchestrator::Orchestrator;
    use crate::session::RequestGate;
    use crate::telemetry::TelemetrySink;
    use crate::types::{ErrorCategory, Result, TelemetryRecord};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tower::ServiceExt;

    struct FixedProvider(Option<&'static str>);

    struct PanickingProvider;

    #[async_trait]
    impl TextProvider for PanickingProvider {
        async fn generate(&self, _question: &str, _system_instruction: &str) -> Result<String> {
            let choices: Vec<String> = Vec::new();
            Ok(choices[0].clone())
        }

        fn name(&self) -> &str {
            "primary"
        }

        fn model(&self) -> &str {
            "broken"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl TextProvider for FixedProvider {
        async fn generate(&self, _question: &str, _system_instruction: &str) -> Result<String> {
            match self.0 {
                Some(text) => Ok(text.to_string()),
                None => Err(GuideError::llm_with_category(ErrorCategory::Network, "down")),
            }
        }

        fn name(&self) -> &str {
            "primary"
        }

        fn model(&self) -> &str {
            "fixed"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CountingSink(Mutex<usize>);

    impl TelemetrySink for CountingSink {
        fn emit(&self, _record: TelemetryRecord) -> Option<JoinHandle<()>> {
            *self.0.lock().unwrap() += 1;
            None
        }
    }

    fn app_with(reply: Option<&'static str>, providers: bool, sink: Arc<CountingSink>) -> Router {
        let mut builder = ProviderChainBuilder::new("instruction");
        if providers {
            builder = builder.add_provider(FixedProvider(reply), Duration::from_secs(1));
        }
        let orchestrator = Orchestrator::new(
            builder.build(),
            RequestGate::new(Duration::from_secs(5)),
            RankExtractor::new("Physics Club"),
            sink,
        );
        crate::server::router(AppState::new(Arc::new(orchestrator)))
    }

    fn app(reply: Option<&'static str>) -> Router {
        app_with(reply, true, Arc::new(CountingSink::default()))
    }

    fn form_post(body: &str, session: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(COOKIE, format!("clubguide_session={}", session))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_form_question_is_answered() {
        let sink = Arc::new(CountingSink::default());
        let app = app_with(Some("1. Physics Club"), true, sink.clone());

        let response = app.oneshot(form_post("question=robots", "s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["response"], "1. Physics Club");
        assert_eq!(body["source"], "primary");
        assert!(body.get("throttled").is_none());
        assert_eq!(*sink.0.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_post_json_question_is_answered() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"question":"robots"}"#))
            .unwrap();

        let response = app(Some("ok")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());
        assert_eq!(json_body(response).await["response"], "ok");
    }

    #[tokio::test]
    async fn test_post_empty_question_is_bad_request() {
        for body in ["question=", "question=%20%20", "other=1"] {
            let response = app(Some("ok")).oneshot(form_post(body, "s1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = json_body(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], EMPTY_QUESTION_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_second_post_within_window_is_throttled() {
        let sink = Arc::new(CountingSink::default());
        let app = app_with(Some("ok"), true, sink.clone());

        let first = app.clone().oneshot(form_post("question=a", "tab")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(form_post("question=a", "tab")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let body = json_body(second).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["throttled"], true);
        assert_eq!(body["response"], THROTTLED_MESSAGE);
        assert_eq!(*sink.0.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fallback_answer_is_success_without_telemetry() {
        let sink = Arc::new(CountingSink::default());
        let app = app_with(None, true, sink.clone());

        let response = app.oneshot(form_post("question=a", "s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "fallback");
        assert_eq!(*sink.0.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_providers_is_service_unavailable() {
        let app = app_with(None, false, Arc::new(CountingSink::default()));

        let response = app.oneshot(form_post("question=a", "s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], NO_PROVIDERS_MESSAGE);
    }

    #[test]
    fn test_unexpected_error_is_internal() {
        let response = error_response(&GuideError::Config("boom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_provider_panic_is_internal_error() {
        let chain = ProviderChainBuilder::new("instruction")
            .add_provider(PanickingProvider, Duration::from_secs(1))
            .build();
        let orchestrator = Orchestrator::new(
            chain,
            RequestGate::new(Duration::from_secs(5)),
            RankExtractor::new("Physics Club"),
            Arc::new(CountingSink::default()),
        );
        let app = crate::server::router(AppState::new(Arc::new(orchestrator)));

        let response = app.oneshot(form_post("question=hi", "s1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_get_page_issues_session_cookie() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app(Some("ok")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(crate::constants::server::GREETING));
    }

    #[tokio::test]
    async fn test_reset_redirects_and_clears_throttle() {
        let app = app(Some("ok"));

        let first = app.clone().oneshot(form_post("question=a", "tab")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let reset = axum::http::Request::builder()
            .uri("/?reset=1")
            .header(COOKIE, "clubguide_session=tab")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(reset).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

        let again = app.oneshot(form_post("question=b", "tab")).await.unwrap();
        assert!(json_body(again).await.get("throttled").is_none());
    }

    #[tokio::test]
    async fn test_health_reports_providers() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(Some("ok")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["providers"], serde_json::json!(["primary"]));

        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let empty = app_with(None, false, Arc::new(CountingSink::default()));
        let response = empty.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
