use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use asindb_insight::{AnalysisKind, InsightKind};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub asin: String,
    #[serde(default)]
    pub analysis_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InsightsRequest {
    pub data: serde_json::Value,
    #[serde(default)]
    pub insight_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisBody {
    asin: String,
    analysis_type: &'static str,
    analysis: String,
}

#[derive(Debug, Serialize)]
pub(super) struct InsightsBody {
    insight_type: &'static str,
    insights: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AiHealthBody {
    openai_available: bool,
    anthropic_available: bool,
    service_ready: bool,
}

pub(super) async fn analyze_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisBody>>, ApiError> {
    let asin = request.asin.trim();
    if asin.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "asin must be non-empty",
        ));
    }

    // Unrecognized kinds fall back to "comprehensive" rather than erroring.
    let kind = AnalysisKind::parse(request.analysis_type.as_deref().unwrap_or_default());
    let analysis = state.insight.analyze_product(asin, kind).await;

    Ok(Json(ApiResponse {
        data: AnalysisBody {
            asin: asin.to_string(),
            analysis_type: kind.as_str(),
            analysis,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn generate_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<InsightsRequest>,
) -> Json<ApiResponse<InsightsBody>> {
    let kind = InsightKind::parse(request.insight_type.as_deref().unwrap_or_default());
    let insights = state.insight.generate_insights(&request.data, kind).await;

    Json(ApiResponse {
        data: InsightsBody {
            insight_type: kind.as_str(),
            insights,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<AiHealthBody>> {
    let health = state.insight.health();

    Json(ApiResponse {
        data: AiHealthBody {
            openai_available: health.openai_available,
            anthropic_available: health.anthropic_available,
            service_ready: health.service_ready,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
