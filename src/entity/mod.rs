pub mod basket_products;
pub mod baskets;
pub mod products;
pub mod users;

pub use basket_products::Entity as BasketProducts;
pub use baskets::Entity as Baskets;
pub use products::Entity as Products;
pub use users::Entity as Users;
