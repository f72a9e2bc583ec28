use sea_orm::entity::prelude::*;

/// Pivot between baskets and products; one row per (basket, product) pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "basket_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub basket_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::baskets::Entity",
        from = "Column::BasketId",
        to = "super::baskets::Column::Id",
        on_delete = "Cascade"
    )]
    Baskets,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_delete = "Cascade"
    )]
    Products,
}

impl Related<super::baskets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Baskets.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
