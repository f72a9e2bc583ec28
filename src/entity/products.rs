use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::basket_products::Entity")]
    BasketProducts,
}

impl Related<super::basket_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BasketProducts.def()
    }
}

impl Related<super::baskets::Entity> for Entity {
    fn to() -> RelationDef {
        super::basket_products::Relation::Baskets.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::basket_products::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
