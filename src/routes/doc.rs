use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::baskets::{
        AddProductRequest, BasketDetail, BasketList, CreateBasketRequest, UpdateQuantityRequest,
    },
    models::{Basket, BasketProduct, Product, User},
    response::{ApiResponse, Meta},
    routes::{baskets, health, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        baskets::list_baskets,
        baskets::get_basket,
        baskets::create_basket,
        baskets::delete_basket,
        baskets::add_product,
        baskets::update_product,
        baskets::remove_product,
        baskets::basket_by_user
    ),
    components(
        schemas(
            User,
            Product,
            Basket,
            BasketProduct,
            BasketList,
            BasketDetail,
            CreateBasketRequest,
            AddProductRequest,
            UpdateQuantityRequest,
            params::Pagination,
            Meta,
            ApiResponse<Basket>,
            ApiResponse<BasketList>,
            ApiResponse<BasketDetail>,
            ApiResponse<BasketProduct>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Baskets", description = "Shopping basket endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
