use thiserror::Error;

/// Errors returned when decoding nullable values.
#[derive(Debug, Error)]
pub enum NullError {
    /// `reason` is set when a string was rejected as a timestamp.
    #[error(
        "null: cannot unmarshal {type_name} into NullTime{}",
        .reason.map(|r| format!(": {r}")).unwrap_or_default()
    )]
    TypeMismatch {
        type_name: &'static str,
        reason: Option<chrono::ParseError>,
    },

    #[error("null: year {year} outside of range [0,9999]")]
    YearOutOfRange { year: i32 },

    #[error("null: json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("null: parse time: {0}")]
    Parse(#[from] chrono::ParseError),
}

/// Result type for nullable value operations.
pub type NullResult<T> = Result<T, NullError>;
