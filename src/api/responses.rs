use crate::analysis::AnalysisResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Convenience projection of one suspicious account: `ring_id` is the first
/// ring membership or empty when the account is in no ring.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuspiciousAccountView {
    pub account_id: String,
    pub suspicion_score: u32,
    pub ring_id: String,
}

pub fn suspicious_projection(result: &AnalysisResult) -> Vec<SuspiciousAccountView> {
    result
        .accounts
        .iter()
        .filter(|a| a.is_suspicious)
        .map(|a| SuspiciousAccountView {
            account_id: a.account_id.clone(),
            suspicion_score: a.suspicion_score,
            ring_id: a.ring_ids.first().cloned().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct AnalyzeData {
    pub result: AnalysisResult,
    pub suspicious_accounts: Vec<SuspiciousAccountView>,
}

#[derive(Debug, Serialize)]
pub struct CsvAnalyzeData {
    pub result: AnalysisResult,
    pub suspicious_accounts: Vec<SuspiciousAccountView>,
    pub ingest_warnings: Vec<String>,
    pub rejected_records: usize,
}
