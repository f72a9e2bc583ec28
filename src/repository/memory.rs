use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, Resource},
    models::{Basket, BasketProduct, Product, User},
    repository::BasketRepository,
};

#[derive(Debug, Clone)]
struct Line {
    basket_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    // insertion order doubles as creation order
    baskets: Vec<Basket>,
    lines: Vec<Line>,
}

impl Store {
    fn to_basket_product(&self, line: &Line) -> AppResult<BasketProduct> {
        let product = self.products.get(&line.product_id).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "association references missing product {}",
                line.product_id
            ))
        })?;
        Ok(BasketProduct {
            basket_id: line.basket_id,
            product_id: line.product_id,
            quantity: line.quantity,
            price: product.price,
            created_at: line.created_at,
        })
    }

    fn line_index(&self, basket_id: Uuid, product_id: Uuid) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.basket_id == basket_id && l.product_id == product_id)
    }
}

/// In-process repository backed by a single mutex-guarded store.
///
/// Each primitive holds the lock for its whole body, which gives the same
/// per-statement atomicity the database provides.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, name: &str, email: &str) -> AppResult<User> {
        let mut store = self.store.lock().await;
        if store.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(format!("email {email} already taken")));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn add_product(
        &self,
        name: &str,
        description: Option<&str>,
        price: i64,
    ) -> AppResult<Product> {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".to_string()));
        }
        let mut store = self.store.lock().await;
        if store.products.values().any(|p| p.name == name) {
            return Err(AppError::Conflict(format!("product {name} already exists")));
        }
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
            created_at: Utc::now(),
        };
        store.products.insert(product.id, product.clone());
        Ok(product)
    }
}

impl BasketRepository for MemoryRepository {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.store.lock().await.users.get(&id).cloned())
    }

    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.store.lock().await.products.get(&id).cloned())
    }

    async fn find_basket(&self, id: Uuid) -> AppResult<Option<Basket>> {
        let store = self.store.lock().await;
        Ok(store.baskets.iter().find(|b| b.id == id).cloned())
    }

    async fn list_baskets(&self, limit: u64, offset: u64) -> AppResult<Vec<Basket>> {
        let store = self.store.lock().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(store.baskets.iter().skip(skip).take(take).cloned().collect())
    }

    async fn count_baskets(&self) -> AppResult<u64> {
        Ok(self.store.lock().await.baskets.len() as u64)
    }

    async fn create_basket(&self, user_id: Uuid) -> AppResult<Basket> {
        let mut store = self.store.lock().await;
        if !store.users.contains_key(&user_id) {
            return Err(AppError::NotFound(Resource::User));
        }
        let basket = Basket {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        };
        store.baskets.push(basket.clone());
        Ok(basket)
    }

    async fn delete_basket(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.lock().await;
        let before = store.baskets.len();
        store.baskets.retain(|b| b.id != id);
        if store.baskets.len() == before {
            return Ok(false);
        }
        store.lines.retain(|l| l.basket_id != id);
        Ok(true)
    }

    async fn find_basket_by_user(&self, user_id: Uuid) -> AppResult<Option<Basket>> {
        let store = self.store.lock().await;
        Ok(store.baskets.iter().find(|b| b.user_id == user_id).cloned())
    }

    async fn find_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<BasketProduct>> {
        let store = self.store.lock().await;
        store
            .line_index(basket_id, product_id)
            .map(|idx| store.to_basket_product(&store.lines[idx]))
            .transpose()
    }

    async fn upsert_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<BasketProduct> {
        let mut store = self.store.lock().await;
        if !store.baskets.iter().any(|b| b.id == basket_id) {
            return Err(AppError::NotFound(Resource::Basket));
        }
        if !store.products.contains_key(&product_id) {
            return Err(AppError::NotFound(Resource::Product));
        }
        let idx = match store.line_index(basket_id, product_id) {
            Some(idx) => {
                store.lines[idx].quantity = quantity;
                idx
            }
            None => {
                store.lines.push(Line {
                    basket_id,
                    product_id,
                    quantity,
                    created_at: Utc::now(),
                });
                store.lines.len() - 1
            }
        };
        store.to_basket_product(&store.lines[idx])
    }

    async fn update_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<BasketProduct>> {
        let mut store = self.store.lock().await;
        let Some(idx) = store.line_index(basket_id, product_id) else {
            return Ok(None);
        };
        store.lines[idx].quantity = quantity;
        store.to_basket_product(&store.lines[idx]).map(Some)
    }

    async fn delete_association(&self, basket_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.lock().await;
        match store.line_index(basket_id, product_id) {
            Some(idx) => {
                store.lines.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_associations(&self, basket_id: Uuid) -> AppResult<Vec<BasketProduct>> {
        let store = self.store.lock().await;
        store
            .lines
            .iter()
            .filter(|l| l.basket_id == basket_id)
            .map(|l| store.to_basket_product(l))
            .collect()
    }

    async fn count_associations(&self, basket_id: Uuid) -> AppResult<u64> {
        let store = self.store.lock().await;
        Ok(store.lines.iter().filter(|l| l.basket_id == basket_id).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basket_for_missing_user_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo.create_basket(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::User)));
    }

    #[tokio::test]
    async fn upsert_requires_both_parent_rows() -> anyhow::Result<()> {
        let repo = MemoryRepository::new();
        let user = repo.add_user("Ann", "ann@example.com").await?;
        let basket = repo.create_basket(user.id).await?;
        let product = repo.add_product("Mug", None, 500).await?;

        let err = repo
            .upsert_association(Uuid::new_v4(), product.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Basket)));

        let err = repo
            .upsert_association(basket.id, Uuid::new_v4(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Resource::Product)));

        assert_eq!(repo.count_associations(basket.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let repo = MemoryRepository::new();
        let err = repo.add_product("Mug", None, -1).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "price must not be negative"));
    }
}
