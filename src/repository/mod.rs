//! Persistence seam for the basket service.
//!
//! Every mutating primitive must be atomic at the storage layer: callers never
//! observe a half-written association row.

use std::future::Future;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Basket, BasketProduct, Product, User},
};

pub mod memory;
pub mod orm;

pub use memory::MemoryRepository;
pub use orm::OrmRepository;

pub trait BasketRepository: Clone + Send + Sync + 'static {
    fn find_user(&self, id: Uuid) -> impl Future<Output = AppResult<Option<User>>> + Send;

    fn find_product(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Product>>> + Send;

    fn find_basket(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Basket>>> + Send;

    /// Baskets ordered by creation time, oldest first.
    fn list_baskets(
        &self,
        limit: u64,
        offset: u64,
    ) -> impl Future<Output = AppResult<Vec<Basket>>> + Send;

    fn count_baskets(&self) -> impl Future<Output = AppResult<u64>> + Send;

    fn create_basket(&self, user_id: Uuid) -> impl Future<Output = AppResult<Basket>> + Send;

    /// Removes the basket together with its associations. Returns whether a basket was removed.
    fn delete_basket(&self, id: Uuid) -> impl Future<Output = AppResult<bool>> + Send;

    /// The user's oldest basket, if any.
    fn find_basket_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Option<Basket>>> + Send;

    fn find_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = AppResult<Option<BasketProduct>>> + Send;

    /// Inserts the association or overwrites the quantity of the existing one.
    fn upsert_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> impl Future<Output = AppResult<BasketProduct>> + Send;

    /// Overwrites the quantity of an existing association; `None` if there is none.
    fn update_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> impl Future<Output = AppResult<Option<BasketProduct>>> + Send;

    /// Returns whether a row was removed.
    fn delete_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = AppResult<bool>> + Send;

    /// Lines of a basket ordered by the time they were first attached.
    fn list_associations(
        &self,
        basket_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<BasketProduct>>> + Send;

    fn count_associations(&self, basket_id: Uuid) -> impl Future<Output = AppResult<u64>> + Send;
}
