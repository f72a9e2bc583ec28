use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        basket_products::{
            ActiveModel as LineActive, Column as LineCol, Entity as BasketProducts,
            Model as LineModel,
        },
        baskets::{
            ActiveModel as BasketActive, Column as BasketCol, Entity as Baskets,
            Model as BasketModel,
        },
        products::{Entity as Products, Model as ProductModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Basket, BasketProduct, Product, User},
    repository::BasketRepository,
};

/// PostgreSQL-backed repository over sea-orm.
#[derive(Debug, Clone)]
pub struct OrmRepository {
    orm: DatabaseConnection,
}

impl OrmRepository {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

impl BasketRepository for OrmRepository {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = Users::find_by_id(id).one(&self.orm).await?;
        Ok(user.map(user_from_entity))
    }

    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let product = Products::find_by_id(id).one(&self.orm).await?;
        Ok(product.map(product_from_entity))
    }

    async fn find_basket(&self, id: Uuid) -> AppResult<Option<Basket>> {
        let basket = Baskets::find_by_id(id).one(&self.orm).await?;
        Ok(basket.map(basket_from_entity))
    }

    async fn list_baskets(&self, limit: u64, offset: u64) -> AppResult<Vec<Basket>> {
        let baskets = Baskets::find()
            .order_by_asc(BasketCol::CreatedAt)
            .order_by_asc(BasketCol::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(basket_from_entity)
            .collect();
        Ok(baskets)
    }

    async fn count_baskets(&self) -> AppResult<u64> {
        Ok(Baskets::find().count(&self.orm).await?)
    }

    async fn create_basket(&self, user_id: Uuid) -> AppResult<Basket> {
        let basket = BasketActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await?;
        Ok(basket_from_entity(basket))
    }

    async fn delete_basket(&self, id: Uuid) -> AppResult<bool> {
        let txn = self.orm.begin().await?;

        BasketProducts::delete_many()
            .filter(LineCol::BasketId.eq(id))
            .exec(&txn)
            .await?;
        let result = Baskets::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_basket_by_user(&self, user_id: Uuid) -> AppResult<Option<Basket>> {
        let basket = Baskets::find()
            .filter(BasketCol::UserId.eq(user_id))
            .order_by_asc(BasketCol::CreatedAt)
            .order_by_asc(BasketCol::Id)
            .one(&self.orm)
            .await?;
        Ok(basket.map(basket_from_entity))
    }

    async fn find_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<BasketProduct>> {
        fetch_line(&self.orm, basket_id, product_id).await
    }

    async fn upsert_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<BasketProduct> {
        let txn = self.orm.begin().await?;

        let line = LineActive {
            basket_id: Set(basket_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: NotSet,
        };
        // A missing basket or product fails the foreign key and maps to NotFound.
        BasketProducts::insert(line)
            .on_conflict(
                OnConflict::columns([LineCol::BasketId, LineCol::ProductId])
                    .update_column(LineCol::Quantity)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let line = fetch_line(&txn, basket_id, product_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "association {basket_id}/{product_id} vanished after upsert"
                ))
            })?;

        txn.commit().await?;
        Ok(line)
    }

    async fn update_association(
        &self,
        basket_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<BasketProduct>> {
        let txn = self.orm.begin().await?;

        let result = BasketProducts::update_many()
            .col_expr(LineCol::Quantity, Expr::value(quantity))
            .filter(LineCol::BasketId.eq(basket_id))
            .filter(LineCol::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let line = fetch_line(&txn, basket_id, product_id).await?;
        txn.commit().await?;
        Ok(line)
    }

    async fn delete_association(&self, basket_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let result = BasketProducts::delete_many()
            .filter(LineCol::BasketId.eq(basket_id))
            .filter(LineCol::ProductId.eq(product_id))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_associations(&self, basket_id: Uuid) -> AppResult<Vec<BasketProduct>> {
        BasketProducts::find()
            .filter(LineCol::BasketId.eq(basket_id))
            .order_by_asc(LineCol::CreatedAt)
            .order_by_asc(LineCol::ProductId)
            .find_also_related(Products)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|(line, product)| line_from_entity(line, product))
            .collect()
    }

    async fn count_associations(&self, basket_id: Uuid) -> AppResult<u64> {
        let count = BasketProducts::find()
            .filter(LineCol::BasketId.eq(basket_id))
            .count(&self.orm)
            .await?;
        Ok(count)
    }
}

async fn fetch_line<C: ConnectionTrait>(
    conn: &C,
    basket_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<BasketProduct>> {
    BasketProducts::find_by_id((basket_id, product_id))
        .find_also_related(Products)
        .one(conn)
        .await?
        .map(|(line, product)| line_from_entity(line, product))
        .transpose()
}

fn line_from_entity(line: LineModel, product: Option<ProductModel>) -> AppResult<BasketProduct> {
    let product = product.ok_or_else(|| {
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
        created_at: line.created_at.with_timezone(&Utc),
    })
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn basket_from_entity(model: BasketModel) -> Basket {
    Basket {
        id: model.id,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
