//! Drawing extraction endpoints
//!
//! - POST /api/v1/drawings/process - Extract balloons and dimensions from one page

use axum::{
    body::Bytes,
    extract::State,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::drawing::ProcessingResult;
use crate::error::Result;
use crate::state::AppState;
use crate::upload::validate_upload;

/// Envelope returned for every processed page
#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub data: ProcessingResult,
    pub metadata: RunMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub timestamp: String,
    pub run_id: String,
    pub rasterizer: String,
    pub ocr_engine: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/process", post(process_drawing))
}

/// Run the extraction pipeline on the request body
async fn process_drawing(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessResponse>> {
    let format = validate_upload(&body, state.config().upload.max_bytes)?;
    let run_id = Uuid::new_v4().to_string();
    tracing::info!(
        "Processing drawing run {} ({} bytes, pdf: {})",
        run_id,
        body.len(),
        format.is_pdf()
    );

    let pipeline = state.pipeline();
    let result = pipeline.process_page(&body).await;

    if result.is_unreadable() {
        tracing::warn!("Run {} produced no dimensions: {:?}", run_id, result.errors);
    }

    Ok(Json(ProcessResponse {
        success: !result.is_unreadable(),
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            run_id,
            rasterizer: pipeline.rasterizer_name().to_string(),
            ocr_engine: pipeline.ocr_name().to_string(),
        },
        data: result,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::drawing::acquirer::tests::{word, MockOcr, MockRasterizer};
    use crate::drawing::Pipeline;
    use crate::raster::placeholder_png;
    use crate::routes::app;
    use crate::state::AppState;

    fn state_with(config: Config, rasterizer: MockRasterizer, ocr: MockOcr) -> AppState {
        let pipeline = Pipeline::new(
            config.pipeline.clone(),
            Arc::new(rasterizer),
            Arc::new(ocr),
        );
        AppState::new(config, pipeline)
    }

    fn ok_raster() -> MockRasterizer {
        MockRasterizer {
            fail: false,
            delay: None,
        }
    }

    fn process_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/drawings/process")
            .header("content-type", "application/octet-stream")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = state_with(Config::default(), ok_raster(), MockOcr::with_words(Vec::new()));
        let response = app(state)
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_process_returns_envelope() {
        let ocr = MockOcr::with_words(vec![
            word("4", 100.0, 100.0, 95.0),
            word("12.5", 150.0, 100.0, 90.0),
        ]);
        let state = state_with(Config::default(), ok_raster(), ocr);
        let page = placeholder_png(8, 8).unwrap();

        let response = app(state).oneshot(process_request(page)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["isVectorBased"], false);
        assert_eq!(json["data"]["pageCount"], 1);
        assert_eq!(json["data"]["balloons"][0]["number"], 4);
        assert_eq!(json["data"]["dimensions"][0]["dimension"]["value"], "12.5");
        assert_eq!(json["data"]["dimensions"][0]["dimension"]["type"], "linear");
        assert_eq!(json["metadata"]["rasterizer"], "mock-raster");
        assert_eq!(json["metadata"]["ocrEngine"], "mock-ocr");
        assert!(json["metadata"]["runId"].as_str().unwrap().len() == 36);
    }

    #[tokio::test]
    async fn test_unreadable_page_reports_failure() {
        let failing = MockRasterizer {
            fail: true,
            delay: None,
        };
        let state = state_with(Config::default(), failing, MockOcr::failing());

        let response = app(state)
            .oneshot(process_request(b"%PDF-1.7 broken".to_vec()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(!json["data"]["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_empty_body() {
        let state = state_with(Config::default(), ok_raster(), MockOcr::with_words(Vec::new()));
        let response = app(state).oneshot(process_request(Vec::new())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_rejects_unknown_format() {
        let state = state_with(Config::default(), ok_raster(), MockOcr::with_words(Vec::new()));
        let response = app(state)
            .oneshot(process_request(b"plain text, not a drawing".to_vec()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let mut config = Config::default();
        config.upload.max_bytes = 16;
        let state = state_with(config, ok_raster(), MockOcr::with_words(Vec::new()));

        let response = app(state)
            .oneshot(process_request(vec![b'%'; 64]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
