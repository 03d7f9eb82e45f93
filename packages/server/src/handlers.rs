//! HTTP handler functions for the patrol report API.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use patrol_report_server_models::{
    AnalyzeRequest, AnalyzeResponse, ApiError, ApiHealth, ApiReport, ApiTotals,
    LocationsResponse, ResetResponse, TotalsResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/analyze`
///
/// Extracts the report, persists it and returns the record together with
/// the updated global totals.
pub async fn analyze(state: web::Data<AppState>, body: web::Json<AnalyzeRequest>) -> HttpResponse {
    if body.text.trim().is_empty() {
        return HttpResponse::BadRequest().json(ApiError::new("Texto do relatório vazio"));
    }

    match state.submit(&body.text).await {
        Ok((stored, totals)) => {
            let mut data = ApiReport::from(stored.record);
            data.id = Some(stored.id);
            data.created_at = Some(stored.created_at);

            HttpResponse::Ok().json(AnalyzeResponse {
                success: true,
                data,
                totals: totals.into(),
            })
        }
        Err(e) => {
            log::error!("Failed to store report: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to store report"))
        }
    }
}

/// `POST /api/reset`
///
/// Deletes every stored report. Idempotent.
pub async fn reset(state: web::Data<AppState>) -> HttpResponse {
    match state.reset().await {
        Ok(removed) => {
            log::info!("Reset removed {removed} report(s)");
            HttpResponse::Ok().json(ResetResponse {
                success: true,
                removed,
            })
        }
        Err(e) => {
            log::error!("Failed to reset reports: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to reset reports"))
        }
    }
}

/// `GET /api/totals`
pub async fn totals(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(TotalsResponse {
        success: true,
        totals: state.totals().await.into(),
    })
}

/// `GET /api/reports/by-location`
pub async fn by_location(state: web::Data<AppState>) -> HttpResponse {
    let locations: BTreeMap<String, ApiTotals> = state
        .locations()
        .await
        .into_iter()
        .map(|(location, totals)| (location.to_string(), totals.into()))
        .collect();

    HttpResponse::Ok().json(LocationsResponse {
        success: true,
        locations,
    })
}
