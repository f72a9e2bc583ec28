use std::fmt;

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    pricing::PricingError,
    response::{ApiResponse, Meta},
};

/// The kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Basket,
    Product,
    /// A (basket, product) pair with no association row.
    BasketProduct,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::User => "User",
            Resource::Basket => "Basket",
            Resource::Product => "Product",
            Resource::BasketProduct => "Product in basket",
        };
        f.write_str(name)
    }
}

impl Resource {
    /// The parent row a violated foreign key points at, judged by the constraint name.
    pub fn from_foreign_key(detail: &str) -> Option<Self> {
        if detail.contains("basket_id_fkey") {
            Some(Resource::Basket)
        } else if detail.contains("product_id_fkey") {
            Some(Resource::Product)
        } else if detail.contains("user_id_fkey") {
            Some(Resource::User)
        } else {
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("{0}")]
    BadRequest(String),

    #[error("Resource already exists")]
    Conflict(String),

    #[error("Database error")]
    OrmError(DbErr),

    #[error("Pricing error")]
    Pricing(#[from] PricingError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
            // The parent row vanished between the existence check and the write.
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                match Resource::from_foreign_key(&detail) {
                    Some(resource) => AppError::NotFound(resource),
                    None => AppError::OrmError(err),
                }
            }
            _ => AppError::OrmError(err),
        }
    }
}

impl From<ValidationErrors> for AppError {
    /// Keeps only the first failure, taking fields in name order.
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .and_then(|(field, errors)| {
                errors.first().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("The {field} field is invalid."))
                })
            })
            .unwrap_or_else(|| "Validation error".to_string());
        AppError::BadRequest(message)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(detail) => {
                tracing::warn!(detail = %detail, "unique constraint violated");
                StatusCode::BAD_REQUEST
            }
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Pricing(err) => {
                tracing::error!(error = %err, "pricing error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = self.to_string();

        let body = ApiResponse {
            message: message.clone(),
            content: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::repository::MemoryRepository;

    async fn render(err: AppError) -> anyhow::Result<(StatusCode, Value)> {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn not_found_and_bad_request_are_client_errors() -> anyhow::Result<()> {
        let (status, body) = render(AppError::NotFound(Resource::BasketProduct)).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product in basket not found");
        assert_eq!(body["content"]["error"], "Product in basket not found");

        let (status, body) = render(AppError::BadRequest("bad quantity".into())).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["content"]["error"], "bad quantity");
        Ok(())
    }

    #[tokio::test]
    async fn conflict_maps_to_bad_request() -> anyhow::Result<()> {
        let (status, body) = render(AppError::Conflict("users_email_key".into())).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Resource already exists");
        assert_eq!(body["content"]["error"], "Resource already exists");
        Ok(())
    }

    #[tokio::test]
    async fn server_side_failures_map_to_500() -> anyhow::Result<()> {
        let failures = [
            AppError::from(DbErr::Custom("connection reset".into())),
            AppError::from(PricingError::Overflow {
                product_id: Uuid::nil(),
            }),
            AppError::from(anyhow::anyhow!("boom")),
        ];
        for err in failures {
            let (status, body) = render(err).await?;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body["message"].is_string());
            assert!(body["content"]["error"].is_string());
        }
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> anyhow::Result<()> {
        let repo = MemoryRepository::new();
        repo.add_user("Ada", "ada@example.com").await?;

        let err = repo
            .add_user("Ada Again", "ada@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let (status, _) = render(err).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[test]
    fn foreign_key_names_identify_the_missing_parent() {
        let detail = |name: &str| {
            format!(
                "insert or update on table \"basket_products\" violates foreign key constraint \"{name}\""
            )
        };
        assert_eq!(
            Resource::from_foreign_key(&detail("basket_products_basket_id_fkey")),
            Some(Resource::Basket)
        );
        assert_eq!(
            Resource::from_foreign_key(&detail("basket_products_product_id_fkey")),
            Some(Resource::Product)
        );
        assert_eq!(
            Resource::from_foreign_key(&detail("baskets_user_id_fkey")),
            Some(Resource::User)
        );
        assert_eq!(Resource::from_foreign_key("something else"), None);
    }
}
