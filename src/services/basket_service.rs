use uuid::Uuid;

use crate::{
    dto::baskets::BasketDetail,
    error::{AppError, AppResult, Resource},
    models::{Basket, BasketProduct, Product},
    pricing::{basket_total, format_minor_units},
    repository::BasketRepository,
};

/// Quantity used when a product is attached without one.
pub const DEFAULT_QUANTITY: i32 = 1;

/// Basket lifecycle and basket-product association rules over an injected repository.
#[derive(Debug, Clone)]
pub struct BasketService<R> {
    repo: R,
}

impl<R: BasketRepository> BasketService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// One page of baskets plus the total number of baskets.
    pub async fn list_baskets(&self, limit: u64, offset: u64) -> AppResult<(Vec<Basket>, u64)> {
        let items = self.repo.list_baskets(limit, offset).await?;
        let total = self.repo.count_baskets().await?;
        Ok((items, total))
    }

    pub async fn get_basket(&self, basket_id: Uuid) -> AppResult<BasketDetail> {
        let basket = self.require_basket(basket_id).await?;
        self.detail(basket).await
    }

    pub async fn create_basket(&self, user_id: Uuid) -> AppResult<Basket> {
        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        let basket = self.repo.create_basket(user_id).await?;
        tracing::info!(basket_id = %basket.id, user_id = %user_id, "basket created");
        Ok(basket)
    }

    /// Deletes the basket and every product line it holds.
    pub async fn delete_basket(&self, basket_id: Uuid) -> AppResult<()> {
        if !self.repo.delete_basket(basket_id).await? {
            return Err(AppError::NotFound(Resource::Basket));
        }
        tracing::info!(basket_id = %basket_id, "basket deleted");
        Ok(())
    }

    /// The user's oldest basket.
    pub async fn get_basket_by_user(&self, user_id: Uuid) -> AppResult<BasketDetail> {
        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        let basket = self
            .repo
            .find_basket_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Basket))?;
        self.detail(basket).await
    }

    /// Attaches a product, overwriting the quantity if the pair is already associated.
    pub async fn attach_product(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: Option<i32>,
    ) -> AppResult<BasketProduct> {
        let quantity = quantity.unwrap_or(DEFAULT_QUANTITY);
        self.require_basket(basket_id).await?;
        self.require_product(product_id).await?;
        ensure_quantity(quantity)?;

        let line = self
            .repo
            .upsert_association(basket_id, product_id, quantity)
            .await?;
        tracing::info!(
            basket_id = %basket_id,
            product_id = %product_id,
            quantity,
            "product attached"
        );
        Ok(line)
    }

    pub async fn update_quantity(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<BasketProduct> {
        ensure_quantity(quantity)?;
        self.require_basket(basket_id).await?;
        self.require_product(product_id).await?;

        let line = self
            .repo
            .update_association(basket_id, product_id, quantity)
            .await?
            .ok_or(AppError::NotFound(Resource::BasketProduct))?;
        tracing::info!(
            basket_id = %basket_id,
            product_id = %product_id,
            quantity,
            "quantity updated"
        );
        Ok(line)
    }

    /// Returns `false` when the product was not in the basket.
    pub async fn detach_product(&self, basket_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        self.require_basket(basket_id).await?;
        self.require_product(product_id).await?;

        let removed = self.repo.delete_association(basket_id, product_id).await?;
        if removed {
            tracing::info!(basket_id = %basket_id, product_id = %product_id, "product detached");
        } else {
            tracing::debug!(basket_id = %basket_id, product_id = %product_id, "nothing to detach");
        }
        Ok(removed)
    }

    pub async fn has_products(&self, basket_id: Uuid) -> AppResult<bool> {
        Ok(self.repo.count_associations(basket_id).await? > 0)
    }

    /// Exact basket total in minor units; zero for an empty basket.
    pub async fn compute_total(&self, basket_id: Uuid) -> AppResult<i64> {
        self.require_basket(basket_id).await?;
        let lines = self.repo.list_associations(basket_id).await?;
        Ok(basket_total(&lines)?)
    }

    async fn require_basket(&self, basket_id: Uuid) -> AppResult<Basket> {
        self.repo
            .find_basket(basket_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Basket))
    }

    async fn require_product(&self, product_id: Uuid) -> AppResult<Product> {
        self.repo
            .find_product(product_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Product))
    }

    async fn detail(&self, basket: Basket) -> AppResult<BasketDetail> {
        let products = self.repo.list_associations(basket.id).await?;
        let total = basket_total(&products)?;
        Ok(BasketDetail {
            id: basket.id,
            user_id: basket.user_id,
            created_at: basket.created_at,
            products,
            total,
            total_display: format_minor_units(total),
        })
    }
}

fn ensure_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::repository::MemoryRepository;

    use super::*;

    struct Fixture {
        service: BasketService<MemoryRepository>,
        basket: Basket,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let repo = MemoryRepository::new();
        let user = repo.add_user("Ada", "ada@example.com").await?;
        let service = BasketService::new(repo);
        let basket = service.create_basket(user.id).await?;
        Ok(Fixture { service, basket })
    }

    async fn product(fx: &Fixture, name: &str, price: i64) -> anyhow::Result<Product> {
        Ok(fx.service.repository().add_product(name, None, price).await?)
    }

    #[tokio::test]
    async fn empty_basket_totals_zero() -> anyhow::Result<()> {
        let fx = fixture().await?;
        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 0);
        assert!(!fx.service.has_products(fx.basket.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn attach_defaults_quantity_to_one() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "Mug", 1200).await?;

        let line = fx.service.attach_product(fx.basket.id, p.id, None).await?;
        assert_eq!(line.quantity, 1);
        assert!(fx.service.has_products(fx.basket.id).await?);

        let stored = fx
            .service
            .repository()
            .find_association(fx.basket.id, p.id)
            .await?;
        assert_eq!(stored.map(|l| l.quantity), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn reattach_overwrites_quantity() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "Mug", 1200).await?;

        fx.service.attach_product(fx.basket.id, p.id, Some(2)).await?;
        let line = fx.service.attach_product(fx.basket.id, p.id, Some(7)).await?;
        assert_eq!(line.quantity, 7);

        let lines = fx.service.repository().list_associations(fx.basket.id).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 8400);
        Ok(())
    }

    #[tokio::test]
    async fn total_sums_all_lines() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p1 = product(&fx, "P1", 1000).await?;
        let p2 = product(&fx, "P2", 250).await?;

        fx.service.attach_product(fx.basket.id, p1.id, Some(2)).await?;
        fx.service.attach_product(fx.basket.id, p2.id, Some(3)).await?;

        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 2750);
        let detail = fx.service.get_basket(fx.basket.id).await?;
        assert_eq!(detail.products.len(), 2);
        assert_eq!(detail.total_display, "27.50");
        Ok(())
    }

    #[tokio::test]
    async fn update_reflects_in_total_exactly() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "Book", 1999).await?;

        fx.service.attach_product(fx.basket.id, p.id, None).await?;
        let line = fx.service.update_quantity(fx.basket.id, p.id, 3).await?;
        assert_eq!(line.quantity, 3);
        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 5997);
        Ok(())
    }

    #[tokio::test]
    async fn attach_update_detach_round_trip() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "P1", 1000).await?;

        fx.service.attach_product(fx.basket.id, p.id, Some(1)).await?;
        fx.service.update_quantity(fx.basket.id, p.id, 5).await?;
        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 5000);

        assert!(fx.service.detach_product(fx.basket.id, p.id).await?);
        assert_eq!(fx.service.compute_total(fx.basket.id).await?, 0);
        assert!(!fx.service.has_products(fx.basket.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn detach_unassociated_returns_false() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "P1", 1000).await?;
        assert!(!fx.service.detach_product(fx.basket.id, p.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_without_persisting() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "P1", 1000).await?;

        let err = fx
            .service
            .attach_product(fx.basket.id, p.id, Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!fx.service.has_products(fx.basket.id).await?);

        fx.service.attach_product(fx.basket.id, p.id, None).await?;
        let err = fx
            .service
            .update_quantity(fx.basket.id, p.id, -2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_ids_fail_with_not_found() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "P1", 1000).await?;
        let missing = Uuid::new_v4();

        let err = fx.service.attach_product(missing, p.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        let err = fx.service.attach_product(fx.basket.id, missing, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Product)));

        let err = fx.service.update_quantity(missing, p.id, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        let err = fx.service.update_quantity(fx.basket.id, missing, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Product)));
        let err = fx.service.update_quantity(fx.basket.id, p.id, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::BasketProduct)));

        let err = fx.service.detach_product(missing, p.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        let err = fx.service.detach_product(fx.basket.id, missing).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Product)));

        let err = fx.service.compute_total(missing).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        Ok(())
    }

    #[tokio::test]
    async fn basket_lifecycle() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let p = product(&fx, "P1", 1000).await?;
        fx.service.attach_product(fx.basket.id, p.id, Some(2)).await?;

        let by_user = fx.service.get_basket_by_user(fx.basket.user_id).await?;
        assert_eq!(by_user.id, fx.basket.id);
        assert_eq!(by_user.total, 2000);

        fx.service.delete_basket(fx.basket.id).await?;
        assert!(!fx.service.has_products(fx.basket.id).await?);
        let err = fx.service.get_basket(fx.basket.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        let err = fx.service.delete_basket(fx.basket.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        let err = fx.service.get_basket_by_user(fx.basket.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));
        Ok(())
    }

    #[tokio::test]
    async fn create_basket_requires_user() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let err = fx.service.create_basket(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::User)));
        let err = fx.service.get_basket_by_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::User)));
        Ok(())
    }

    #[tokio::test]
    async fn get_basket_by_user_returns_oldest() -> anyhow::Result<()> {
        let fx = fixture().await?;
        let second = fx.service.create_basket(fx.basket.user_id).await?;
        assert_ne!(second.id, fx.basket.id);

        let found = fx.service.get_basket_by_user(fx.basket.user_id).await?;
        assert_eq!(found.id, fx.basket.id);

        let (items, total) = fx.service.list_baskets(20, 0).await?;
        assert_eq!(total, 2);
        assert_eq!(items.len(), 2);
        let (items, _) = fx.service.list_baskets(1, 1).await?;
        assert_eq!(items.first().map(|b| b.id), Some(second.id));
        Ok(())
    }
}
