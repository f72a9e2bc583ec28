use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use validator::Validate;

use crate::models::{Basket, BasketProduct};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBasketRequest {
    #[validate(required(message = "The user_id field is required."))]
    #[schema(required = true)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddProductRequest {
    #[validate(required(message = "The product_id field is required."))]
    #[schema(required = true)]
    pub product_id: Option<Uuid>,
    /// Defaults to 1 when omitted.
    #[serde(default)]
    #[validate(range(min = 1, message = "The quantity field must be at least 1."))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuantityRequest {
    #[validate(
        required(message = "The quantity field is required."),
        range(min = 1, message = "The quantity field must be at least 1.")
    )]
    #[schema(required = true, minimum = 1)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BasketList {
    #[schema(value_type = Vec<Basket>)]
    pub items: Vec<Basket>,
}

/// A basket with its product lines and valuation.
#[derive(Debug, Serialize, ToSchema)]
pub struct BasketDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub products: Vec<BasketProduct>,
    /// Sum of `price × quantity` in minor units.
    pub total: i64,
    /// `total` rendered with two decimals.
    pub total_display: String,
}
