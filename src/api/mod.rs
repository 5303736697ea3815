//! HTTP surface
//!
//! Thin routing over the core: handlers validate nothing beyond shape,
//! delegate to the pure engines, and serialize the results. All business
//! defaulting (absent channels, missing history) happens in the core.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::cbt::{self, strategy};
use crate::chat::{ChatReply, ChatService};
use crate::context::ConversationMessage;
use crate::emotion::risk::{self, RiskAssessment};
use crate::emotion::types::{
    AudioFeatures, EmotionSnapshot, FacialAnalysis, FusedAnalysis, Intensity, ModalityInput,
    TextAnalysis, VadScore, VoiceAnalysis,
};
use crate::emotion::trends::{self, EmotionTrend};
use crate::emotion::{classify, signals, text, FusionEngine};
use crate::llm::TextGenerator;
use crate::store::SqliteStore;

/// How many persisted snapshots feed history and pattern queries.
const HISTORY_SNAPSHOT_LIMIT: usize = 50;

pub struct AppState {
    pub store: SqliteStore,
    pub fusion: FusionEngine,
    pub generator: Arc<dyn TextGenerator>,
    pub chat: ChatService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/emotion/analyze", post(analyze_emotion))
        .route("/emotion/risk", post(assess_risk))
        .route("/cbt/feedback", post(cbt_feedback))
        .route("/chat", post(chat))
        .route("/history/{session_id}", get(history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            crate::config::CONFIG.request_timeout,
        )))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================================
// Emotion analysis
// ============================================================================

/// Facial channel as submitted: the VAD estimate may be absent, in which
/// case it is derived from the emotion-score map.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialChannel {
    pub vad_score: Option<VadScore>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub landmarks: Vec<(f64, f64)>,
    #[serde(default)]
    pub emotions: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChannel {
    pub vad_score: Option<VadScore>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub audio_features: AudioFeatures,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChannel {
    pub content: Option<String>,
    pub vad_score: Option<VadScore>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub primary_emotion: Option<String>,
    pub intensity: Option<Intensity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub facial: Option<FacialChannel>,
    pub voice: Option<VoiceChannel>,
    pub text: Option<TextChannel>,
    pub session_id: Option<String>,
}

impl AnalyzeRequest {
    /// Resolve submitted channels into full modality payloads, deriving VAD
    /// estimates where the detector did not supply one.
    fn into_modalities(self) -> ModalityInput {
        let facial = self.facial.map(|f| {
            let vad_score = f
                .vad_score
                .unwrap_or_else(|| signals::vad_from_facial_emotions(&f.emotions));
            FacialAnalysis {
                vad_score,
                confidence: f.confidence.unwrap_or(0.8),
                landmarks: f.landmarks,
                emotions: f.emotions,
            }
        });

        let voice = self.voice.map(|v| {
            let vad_score = v
                .vad_score
                .unwrap_or_else(|| signals::vad_from_voice(&v.transcription, &v.audio_features));
            VoiceAnalysis {
                vad_score,
                confidence: v.confidence.unwrap_or(0.8),
                transcription: v.transcription,
                audio_features: v.audio_features,
            }
        });

        let text = self.text.map(|t| match (t.vad_score, &t.content) {
            (Some(vad_score), _) => TextAnalysis {
                vad_score,
                confidence: t.confidence.unwrap_or(0.5),
                keywords: t.keywords,
                primary_emotion: t.primary_emotion,
                intensity: t.intensity,
            },
            (None, Some(content)) => text::analyze_text(content),
            (None, None) => TextAnalysis {
                vad_score: VadScore::NEUTRAL,
                confidence: 0.3,
                keywords: t.keywords,
                primary_emotion: t.primary_emotion,
                intensity: t.intensity,
            },
        });

        ModalityInput { facial, voice, text }
    }
}

/// Fusion output plus, for session-bound requests, movement against the
/// session's previous analyses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: FusedAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<EmotionTrend>,
}

async fn analyze_emotion(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    let session_id = request.session_id.clone();
    let analysis = state.fusion.integrate_analysis(request.into_modalities());

    // Trend vs prior snapshots, then snapshot persistence; both are
    // best-effort and never fail the analysis itself.
    let mut trend = None;
    if let Some(session_id) = session_id {
        let previous = state
            .store
            .recent_snapshots(&session_id, HISTORY_SNAPSHOT_LIMIT)
            .await
            .unwrap_or_default();
        trend = Some(trends::track_emotion_changes(&analysis, &previous));

        if let Err(e) = state
            .store
            .save_snapshot(
                &session_id,
                &analysis.overall_vad,
                analysis.primary_emotion.as_str(),
                analysis.risk_level.as_str(),
                analysis.confidence,
            )
            .await
        {
            warn!("failed to persist emotion snapshot: {e}");
        }
    }

    Json(AnalyzeResponse { analysis, trend })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    pub vad_score: VadScore,
}

async fn assess_risk(Json(request): Json<RiskRequest>) -> Json<RiskAssessment> {
    Json(risk::assess_risk(&request.vad_score))
}

// ============================================================================
// CBT feedback
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub vad_score: VadScore,
    #[serde(default)]
    pub context: String,
    pub session_id: Option<String>,
}

async fn cbt_feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Json<cbt::CbtStrategy> {
    let emotion = classify::classify_emotion(&request.vad_score);

    let history: Vec<EmotionSnapshot> = match &request.session_id {
        Some(session_id) => state
            .store
            .recent_snapshots(session_id, HISTORY_SNAPSHOT_LIMIT)
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let base = strategy::map_strategy(emotion.as_str(), &request.vad_score);
    let elaborated = strategy::elaborate_strategy(
        state.generator.as_ref(),
        base,
        &request.vad_score,
        &request.context,
        &history,
    )
    .await;

    Json(elaborated)
}

// ============================================================================
// Chat & history
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, axum::http::StatusCode> {
    match state.chat.respond(&request.session_id, &request.message).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            warn!("chat turn failed: {e}");
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<ConversationMessage>,
    pub snapshots: Vec<EmotionSnapshot>,
    pub patterns: cbt::PatternAnalysis,
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, axum::http::StatusCode> {
    let messages = state
        .store
        .load_messages(&session_id)
        .await
        .map_err(|e| {
            warn!("failed to load history: {e}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let snapshots = state
        .store
        .recent_snapshots(&session_id, HISTORY_SNAPSHOT_LIMIT)
        .await
        .map_err(|e| {
            warn!("failed to load snapshots: {e}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let patterns = cbt::patterns::analyze_emotion_patterns(&snapshots);

    Ok(Json(HistoryResponse {
        session_id,
        messages,
        snapshots,
        patterns,
    }))
}
