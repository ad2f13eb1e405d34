//! Spreadsheet export handler

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use super::params::YearParams;
use crate::AppState;
use scholarmap_common::{errors::Result, metrics};
use scholarmap_search::{project, ExportKind};

/// `GET /api/export/{kind}` as a CSV download
pub async fn export(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<YearParams>,
) -> Result<impl IntoResponse> {
    let kind: ExportKind = kind.parse()?;
    let filter = params.into_filter()?;

    let snapshot = state.store.snapshot();
    let table = project(&snapshot.model, kind, &filter);
    let body = table.to_csv_bytes()?;
    let file_name = table.file_name(&filter);

    metrics::record_export(kind.as_str(), table.rows.len());
    tracing::info!(kind = %kind, filter = %filter, rows = table.rows.len(), "Export generated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}
