/// Minimal REST API server wrapping the analysis engine.
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;

use crate::analysis::AnalysisEngine;
use crate::api::responses::{
    suspicious_projection, AnalyzeData, ApiResponse, CsvAnalyzeData,
};
use crate::core::{Config, DetectionMode, Transaction};
use crate::ingest;
use crate::metrics;

/// Shared server state.
pub struct ApiState {
    pub engine: AnalysisEngine,
    pub default_mode: DetectionMode,
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let state = web::Data::new(ApiState {
        engine: AnalysisEngine::new(),
        default_mode: config.default_mode,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(256 * 1024 * 1024))
            .app_data(web::PayloadConfig::new(256 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health_check))
            .route("/metrics", web::get().to(metrics_endpoint))
            .route("/api/v1/analyze", web::post().to(analyze))
            .route("/api/v1/analyze/csv", web::post().to(analyze_csv))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": "ringtrace",
        "feature": "fraud ring detection",
        "endpoints": {
            "health": "/health",
            "metrics": "/metrics",
            "analyze": "/api/v1/analyze",
            "analyze_csv": "/api/v1/analyze/csv"
        }
    }))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy"
    }))
}

async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::gather_metrics())
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub transactions: Vec<Transaction>,
    /// `all | cycles | fan-in | fan-out | shell`; server default when absent.
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsvQuery {
    pub mode: Option<String>,
}

fn resolve_mode(raw: &Option<String>, fallback: DetectionMode) -> Result<DetectionMode, String> {
    match raw {
        Some(s) => s.parse::<DetectionMode>().map_err(|e| e.to_string()),
        None => Ok(fallback),
    }
}

/// Analyze a JSON batch of transactions.
async fn analyze(req: web::Json<AnalyzeRequest>, state: web::Data<ApiState>) -> HttpResponse {
    let req = req.into_inner();
    let mode = match resolve_mode(&req.mode, state.default_mode) {
        Ok(mode) => mode,
        Err(e) => {
            metrics::HTTP_REQUESTS_TOTAL
                .with_label_values(&["analyze", "400"])
                .inc();
            return HttpResponse::BadRequest().json(ApiResponse::<AnalyzeData>::error(e));
        }
    };

    let result = state.engine.analyze(req.transactions, mode);
    metrics::observe_analysis(
        result.summary.total_transactions,
        result.summary.fraud_rings_detected,
        result.summary.processing_time_seconds,
    );
    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&["analyze", "200"])
        .inc();

    let suspicious_accounts = suspicious_projection(&result);
    HttpResponse::Ok().json(ApiResponse::ok(AnalyzeData {
        result,
        suspicious_accounts,
    }))
}

/// Analyze a raw CSV body (`transaction_id,sender_id,receiver_id,amount,timestamp`).
async fn analyze_csv(
    body: String,
    query: web::Query<CsvQuery>,
    state: web::Data<ApiState>,
) -> HttpResponse {
    let mode = match resolve_mode(&query.mode, state.default_mode) {
        Ok(mode) => mode,
        Err(e) => {
            metrics::HTTP_REQUESTS_TOTAL
                .with_label_values(&["analyze_csv", "400"])
                .inc();
            return HttpResponse::BadRequest().json(ApiResponse::<CsvAnalyzeData>::error(e));
        }
    };

    let report = match ingest::read_transactions(body.as_bytes()) {
        Ok(report) => report,
        Err(e) => {
            metrics::HTTP_REQUESTS_TOTAL
                .with_label_values(&["analyze_csv", "400"])
                .inc();
            return HttpResponse::BadRequest()
                .json(ApiResponse::<CsvAnalyzeData>::error(e.to_string()));
        }
    };

    let rejected_records = report.rejected.len();
    let result = state.engine.analyze(report.accepted, mode);
    metrics::observe_analysis(
        result.summary.total_transactions,
        result.summary.fraud_rings_detected,
        result.summary.processing_time_seconds,
    );
    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&["analyze_csv", "200"])
        .inc();

    let suspicious_accounts = suspicious_projection(&result);
    HttpResponse::Ok().json(ApiResponse::ok(CsvAnalyzeData {
        result,
        suspicious_accounts,
        ingest_warnings: report.warnings,
        rejected_records,
    }))
}
