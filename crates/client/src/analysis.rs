//! Typed operations against the scam-analysis endpoints.
//!
//! Stateless wrappers over the gateway. Envelope status is checked before
//! any payload is handed to the caller; business failures surface as
//! [`Error::Api`](crate::error::Error), never as trusted data.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::Gateway;

pub const MODELS_PATH: &str = "/api/v1/scam/model/available";
pub const ANALYZE_PATH: &str = "/api/v2/scam/analyze";
pub const RESULTS_PATH: &str = "/api/v2/scam/analyze/results";
pub const RESULT_PATH: &str = "/api/v2/scam/analyze/result";
pub const DOCUMENTS_PATH: &str = "/api/v2/scam/documents";

/// Overall risk verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    Low,
    Moderate,
    High,
    Critical,
}

/// Severity of a single detected signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Scam taxonomy used by classification and reference documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScamType {
    VoicePhishing,
    Smishing,
    Phishing,
    InvestmentFraud,
    RomanceScam,
    Impersonation,
    EmploymentScam,
    ShoppingFraud,
    LoanFraud,
    RentalFraud,
    CryptoFraud,
    IdentityTheft,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailableModels {
    models: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    prompt: String,
}

/// Execution metadata attached to every analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    pub model: String,
    pub analysis_time: NaiveDateTime,
    pub total_processing_time_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// 0-100.
    pub risk_score: u32,
    /// 0-100.
    pub confidence_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScamClassification {
    pub scam_type: ScamType,
    pub scam_sub_type: String,
    pub classification_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSignal {
    pub signal_name: String,
    pub severity: Severity,
    pub evidence_quote: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalTactic {
    pub tactic_name: String,
    pub evidence_quote: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarCase {
    pub case_title: String,
    /// 0-100.
    pub similarity_score: u32,
    pub matched_patterns: Vec<String>,
    /// URL or a description of the source.
    pub case_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub immediate_actions: Vec<String>,
    pub reporting_guidance: String,
    pub prevention_tips: Vec<String>,
}

/// Full analysis produced for a valid prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_summary: String,
    pub risk_assessment: RiskAssessment,
    pub scam_classification: ScamClassification,
    pub detected_signals: Vec<DetectedSignal>,
    pub psychological_tactics: Vec<PsychologicalTactic>,
    pub similar_cases: Vec<SimilarCase>,
    pub recommendation: Recommendation,
}

/// Outcome of an analysis submission. The service may decline to analyze
/// (e.g. the prompt is too short); that is a success envelope with
/// `is_valid_analysis == false` and a reason, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub is_valid_analysis: bool,
    pub analysis_result: Option<AnalysisResult>,
    pub analysis_details: AnalysisDetails,
    #[serde(default)]
    pub invalid_reason: Option<String>,
}

/// One row of the analysis history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub document_id: String,
    pub scam_type: String,
    pub created_at: NaiveDateTime,
}

/// Paginated history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub contents: Vec<HistoryEntry>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
}

/// Full record of one historical analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub document_id: String,
    pub user_id: i64,
    pub prompt: String,
    pub analysis_summary: String,
    pub risk_assessment: RiskAssessment,
    pub scam_classification: ScamClassification,
    pub detected_signals: Vec<DetectedSignal>,
    pub psychological_tactics: Vec<PsychologicalTactic>,
    pub similar_cases: Vec<SimilarCase>,
    pub recommendation: Recommendation,
    pub analysis_details: AnalysisDetails,
    pub created_at: NaiveDateTime,
}

/// One step of a documented scam scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStep {
    pub step: u32,
    pub phase: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    pub signal: String,
    pub description: String,
}

/// Reference scam-case document submitted by operators to enrich the
/// similarity corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScamDocument {
    pub scam_title: String,
    pub scam_type: ScamType,
    pub scam_sub_type: String,
    pub occurred_period: String,
    pub target_profile: String,
    pub contact_channel: String,
    pub scam_scenario: Vec<ScenarioStep>,
    pub key_phrases: Vec<String>,
    pub psychological_tactics: Vec<String>,
    pub financial_mechanism: String,
    pub damage_scale: String,
    pub red_flags: Vec<RedFlag>,
    pub prevention_tips: Vec<String>,
    pub vector_content: String,
    pub source_url: String,
    pub published_date: NaiveDate,
}

impl ScamDocument {
    /// Parse an operator-supplied JSON document. Malformed input is
    /// rejected here, before any network call.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| Error::InvalidInput(format!("invalid document JSON: {e}")))
    }
}

/// Client for the analysis endpoints. Stateless; all auth concerns live
/// in the gateway.
pub struct AnalysisClient {
    gateway: Arc<Gateway>,
}

impl AnalysisClient {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// List the analysis models the service currently offers.
    pub async fn available_models(&self) -> Result<Vec<String>> {
        let data: AvailableModels = self
            .gateway
            .get(MODELS_PATH, &[])
            .await?
            .into_result()?;
        Ok(data.models)
    }

    /// Submit a free-text description for analysis under the given model.
    pub async fn analyze(&self, prompt: &str, model: &str) -> Result<AnalysisOutcome> {
        if prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt must not be empty".to_string()));
        }

        let query = [("model", model.to_string())];
        let request = AnalyzeRequest {
            prompt: prompt.to_string(),
        };
        self.gateway
            .post(ANALYZE_PATH, &query, Some(&request))
            .await?
            .into_result()
    }

    /// Fetch one page of the caller's analysis history.
    pub async fn history(&self, page: u32, limit: u32) -> Result<HistoryPage> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        self.gateway
            .get(RESULTS_PATH, &query)
            .await?
            .into_result()
    }

    /// Fetch the full record of one historical analysis.
    pub async fn detail(&self, id: &str) -> Result<AnalysisDetail> {
        let path = format!("{RESULT_PATH}/{id}");
        self.gateway.get(&path, &[]).await?.into_result()
    }

    /// Submit a reference scam-case document (admin use).
    pub async fn submit_document(&self, document: &ScamDocument) -> Result<()> {
        self.gateway
            .post::<serde_json::Value, _>(DOCUMENTS_PATH, &[], Some(document))
            .await?
            .ok()
    }
}
