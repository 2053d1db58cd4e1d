use serde_json::json;

/// Failures surfaced by the grading core. Every variant maps to a stable
/// wire code so the transport layer can pick a response without string
/// matching.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("unknown or missing actor account")]
    Unauthenticated,

    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("{entity} already exists")]
    Conflict {
        entity: &'static str,
        details: serde_json::Value,
    },

    #[error("no exam results to aggregate")]
    NoResultsToAggregate,

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(entity: &'static str, details: serde_json::Value) -> Self {
        Self::Conflict { entity, details }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidInput { .. } => "bad_params",
            Self::Conflict { .. } => "conflict",
            Self::NoResultsToAggregate => "no_results",
            Self::Storage(_) => "db_query_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            Self::InvalidInput { field, .. } => Some(json!({ "field": field })),
            Self::Conflict { details, .. } => Some(details.clone()),
            _ => None,
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
