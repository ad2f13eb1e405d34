//! Ingestion error types
//!
//! Row-level problems are not errors: they become warnings in the
//! [`IngestionReport`](crate::IngestionReport). These variants abort the
//! whole ingestion and leave the published dataset untouched.

use scholarmap_common::errors::AppError;
use scholarmap_common::model::InvariantViolation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column(s): {0}")]
    MissingColumns(String),

    #[error("Dataset has {rows} rows, limit is {limit}")]
    TooManyRows { rows: usize, limit: usize },

    #[error("Dataset contains no valid rows ({rejected} rejected)")]
    NoValidRows { rejected: usize },

    #[error("Record model invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::Csv(_) | IngestionError::MissingColumns(_) | IngestionError::NoValidRows { .. } => {
                AppError::Validation {
                    message: e.to_string(),
                    field: Some("file".to_string()),
                }
            }
            IngestionError::TooManyRows { rows, limit } => AppError::PayloadTooLarge {
                size: rows,
                limit,
                unit: "rows",
            },
            IngestionError::Invariant(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}
