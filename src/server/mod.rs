//! HTTP surface: the prediction form and a JSON API

pub mod html;

use crate::error::{InputError, PredictError};
use crate::metrics::MetricsSnapshot;
use crate::models::inference::Predictor;
use crate::models::loader::LabelTable;
use crate::types::input::{FormInput, RawInput};
use crate::types::prediction::PredictionReport;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/schema", get(schema))
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Failure of one submission
#[derive(Debug)]
pub enum SubmitError {
    Invalid(InputError),
    Failed(PredictError),
}

impl SubmitError {
    fn status(&self) -> StatusCode {
        match self {
            SubmitError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user
    fn message(&self) -> String {
        match self {
            SubmitError::Invalid(e) => e.to_string(),
            SubmitError::Failed(_) => "prediction failed, please try again later".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Reject a submission before or during validation
fn reject(predictor: &Predictor, error: InputError) -> SubmitError {
    predictor.metrics().record_rejection();
    warn!(error = %error, "Rejected submission");
    SubmitError::Invalid(error)
}

/// Validate and predict one submission
fn submit(predictor: &Predictor, form: FormInput) -> Result<PredictionReport, SubmitError> {
    let input = RawInput::try_from(form).map_err(|e| reject(predictor, e))?;

    predictor.predict(&input).map_err(SubmitError::Failed)
}

/// Run [`submit`] off the async workers, since inference blocks on the session
async fn submit_blocking(
    predictor: Arc<Predictor>,
    form: FormInput,
) -> Result<PredictionReport, SubmitError> {
    tokio::task::spawn_blocking(move || submit(&predictor, form))
        .await
        .map_err(|e| SubmitError::Failed(PredictError::model("prediction task", e)))?
}

async fn index() -> Html<String> {
    Html(html::render_form(&FormInput::default()))
}

async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let e = reject(
                &state.predictor,
                InputError::Malformed(rejection.body_text()),
            );
            let page = html::render_error(&FormInput::default(), &e.message());
            return (e.status(), Html(page)).into_response();
        }
    };

    match submit_blocking(state.predictor.clone(), form.clone()).await {
        Ok(report) => Html(html::render_result(&form, &report)).into_response(),
        Err(e) => (e.status(), Html(html::render_error(&form, &e.message()))).into_response(),
    }
}

async fn predict_json(
    State(state): State<AppState>,
    form: Result<Json<FormInput>, JsonRejection>,
) -> Result<Json<PredictionReport>, SubmitError> {
    let Json(form) = form.map_err(|rejection| {
        reject(
            &state.predictor,
            InputError::Malformed(rejection.body_text()),
        )
    })?;

    submit_blocking(state.predictor.clone(), form).await.map(Json)
}

#[derive(Serialize)]
struct SchemaResponse {
    model: String,
    columns: Vec<String>,
    labels: LabelTable,
}

async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    let artifacts = state.predictor.artifacts();
    Json(SchemaResponse {
        model: artifacts.model.name().to_string(),
        columns: artifacts.schema.clone(),
        labels: artifacts.labels.clone(),
    })
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.predictor.metrics().snapshot())
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let invalid = SubmitError::Invalid(InputError::InvalidCategory {
            field: "Gender",
            value: "X".to_string(),
        });
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(invalid.message().contains("Gender"));

        let failed = SubmitError::Failed(PredictError::UnknownClass(9));
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!failed.message().contains('9'));

        let malformed = SubmitError::Invalid(InputError::Malformed("missing field `Age`".into()));
        assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(malformed.message().contains("Age"));
    }
}
