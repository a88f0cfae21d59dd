use axum::{response::IntoResponse, Json};

/// Error taxonomy for the catalog read path.
///
/// `NotFound` covers both a genuinely absent row and a row outside the
/// viewer's tenant or soft-delete scope; callers cannot tell the two
/// apart. `Conflict` belongs to the authoring flow's duplicate-name rule
/// and is carried here so the shared error surface stays consistent.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for CatalogError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for CatalogError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Self::Connection(e.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Connection(msg) | Self::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };
        (
            status,
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_wrap_message() {
        let err = CatalogError::from(diesel::result::Error::NotFound);
        match err {
            CatalogError::Database(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_hides_scope_detail() {
        let err = CatalogError::NotFound("course".to_string());
        assert_eq!(err.to_string(), "Not found: course");
    }
}
