use crate::{
    repository::{BasketRepository, OrmRepository},
    services::basket_service::BasketService,
};

#[derive(Clone)]
pub struct AppState<R = OrmRepository> {
    pub baskets: BasketService<R>,
}

impl<R: BasketRepository> AppState<R> {
    pub fn new(repo: R) -> Self {
        Self {
            baskets: BasketService::new(repo),
        }
    }
}
