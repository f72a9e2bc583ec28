use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::baskets::{
        AddProductRequest, BasketDetail, BasketList, CreateBasketRequest, UpdateQuantityRequest,
    },
    error::{AppError, AppResult, Resource},
    models::{Basket, BasketProduct},
    repository::BasketRepository,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validation::{ValidatedJson, required},
};

pub fn router<R: BasketRepository>() -> Router<AppState<R>> {
    Router::new()
        .route("/", get(list_baskets::<R>).post(create_basket::<R>))
        .route(
            "/{basket_id}",
            get(get_basket::<R>)
                .post(add_product::<R>)
                .delete(delete_basket::<R>),
        )
        .route(
            "/{basket_id}/products/{product_id}",
            patch(update_product::<R>).delete(remove_product::<R>),
        )
        .route("/users/{user_id}", get(basket_by_user::<R>))
}

#[utoipa::path(
    get,
    path = "/api/baskets",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List baskets", body = ApiResponse<BasketList>)
    ),
    tag = "Baskets"
)]
pub async fn list_baskets<R: BasketRepository>(
    State(state): State<AppState<R>>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> AppResult<Json<ApiResponse<BasketList>>> {
    let Query(pagination) = pagination?;
    let (page, limit, offset) = pagination.normalize();
    let (items, total) = state
        .baskets
        .list_baskets(limit as u64, offset as u64)
        .await?;

    let meta = Meta::new(page, limit, total as i64);
    Ok(Json(ApiResponse::success(
        "OK",
        BasketList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/baskets/{basket_id}",
    params(
        ("basket_id" = Uuid, Path, description = "Basket ID")
    ),
    responses(
        (status = 200, description = "Basket with its products and total", body = ApiResponse<BasketDetail>),
        (status = 404, description = "Basket not found"),
    ),
    tag = "Baskets"
)]
pub async fn get_basket<R: BasketRepository>(
    State(state): State<AppState<R>>,
    basket_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<BasketDetail>>> {
    let Path(basket_id) = basket_id?;
    let detail = state.baskets.get_basket(basket_id).await?;
    Ok(Json(ApiResponse::success("OK", detail, None)))
}

#[utoipa::path(
    post,
    path = "/api/baskets",
    request_body = CreateBasketRequest,
    responses(
        (status = 200, description = "Basket created", body = ApiResponse<Basket>),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "User not found"),
    ),
    tag = "Baskets"
)]
pub async fn create_basket<R: BasketRepository>(
    State(state): State<AppState<R>>,
    ValidatedJson(payload): ValidatedJson<CreateBasketRequest>,
) -> AppResult<Json<ApiResponse<Basket>>> {
    let user_id = required(payload.user_id, "user_id")?;
    let basket = state.baskets.create_basket(user_id).await?;
    Ok(Json(ApiResponse::success(
        "Basket added",
        basket,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/baskets/{basket_id}",
    params(
        ("basket_id" = Uuid, Path, description = "Basket ID")
    ),
    responses(
        (status = 200, description = "Basket removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Basket not found"),
    ),
    tag = "Baskets"
)]
pub async fn delete_basket<R: BasketRepository>(
    State(state): State<AppState<R>>,
    basket_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let Path(basket_id) = basket_id?;
    state.baskets.delete_basket(basket_id).await?;
    Ok(Json(ApiResponse::success(
        format!("Basket with id {basket_id} removed"),
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/baskets/{basket_id}",
    params(
        ("basket_id" = Uuid, Path, description = "Basket ID")
    ),
    request_body = AddProductRequest,
    responses(
        (status = 200, description = "Product added, or its quantity replaced", body = ApiResponse<BasketProduct>),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "Basket or product not found"),
    ),
    tag = "Baskets"
)]
pub async fn add_product<R: BasketRepository>(
    State(state): State<AppState<R>>,
    basket_id: Result<Path<Uuid>, PathRejection>,
    ValidatedJson(payload): ValidatedJson<AddProductRequest>,
) -> AppResult<Json<ApiResponse<BasketProduct>>> {
    let Path(basket_id) = basket_id?;
    let product_id = required(payload.product_id, "product_id")?;
    let line = state
        .baskets
        .attach_product(basket_id, product_id, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::success(
        format!("Product with id {product_id} added to basket"),
        line,
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/baskets/{basket_id}/products/{product_id}",
    params(
        ("basket_id" = Uuid, Path, description = "Basket ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<BasketProduct>),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "Basket, product or basket line not found"),
    ),
    tag = "Baskets"
)]
pub async fn update_product<R: BasketRepository>(
    State(state): State<AppState<R>>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    ValidatedJson(payload): ValidatedJson<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<BasketProduct>>> {
    let Path((basket_id, product_id)) = ids?;
    let quantity = required(payload.quantity, "quantity")?;
    let line = state
        .baskets
        .update_quantity(basket_id, product_id, quantity)
        .await?;
    Ok(Json(ApiResponse::success(
        format!("Product with id {product_id} updated in basket"),
        line,
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/baskets/{basket_id}/products/{product_id}",
    params(
        ("basket_id" = Uuid, Path, description = "Basket ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product removed from basket", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Basket, product or basket line not found"),
    ),
    tag = "Baskets"
)]
pub async fn remove_product<R: BasketRepository>(
    State(state): State<AppState<R>>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let Path((basket_id, product_id)) = ids?;
    if !state.baskets.detach_product(basket_id, product_id).await? {
        return Err(AppError::NotFound(Resource::BasketProduct));
    }
    Ok(Json(ApiResponse::success(
        format!("Product with id {product_id} removed from basket"),
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/baskets/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's basket", body = ApiResponse<BasketDetail>),
        (status = 404, description = "User or basket not found"),
    ),
    tag = "Baskets"
)]
pub async fn basket_by_user<R: BasketRepository>(
    State(state): State<AppState<R>>,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<ApiResponse<BasketDetail>>> {
    let Path(user_id) = user_id?;
    let detail = state.baskets.get_basket_by_user(user_id).await?;
    Ok(Json(ApiResponse::success("OK", detail, None)))
}
