//! Car service.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use db::CarStore;
use domain::{validate_car_request, Car, CarRequest};

use crate::{with_deadline, with_write_deadline, ServiceConfig, ServiceError};

/// Validates car writes and forwards them to a [`CarStore`].
///
/// Validation covers request format only; whether the referenced engine
/// exists is decided by the store.
#[derive(Clone)]
pub struct CarService {
    store: Arc<dyn CarStore>,
    config: ServiceConfig,
}

impl CarService {
    pub fn new(store: Arc<dyn CarStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self))]
    pub async fn get_car_by_id(&self, id: Uuid) -> Result<Car, ServiceError> {
        with_deadline(
            "get_car_by_id",
            self.config.operation_timeout,
            self.store.get_car_by_id(id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_cars_by_brand(&self, brand: &str, include_engine: bool) -> Result<Vec<Car>, ServiceError> {
        with_deadline(
            "get_cars_by_brand",
            self.config.operation_timeout,
            self.store.get_cars_by_brand(brand, include_engine),
        )
        .await
    }

    #[instrument(skip(self, req), fields(brand = %req.brand, engine_id = %req.engine.engine_id))]
    pub async fn create_car(&self, req: &CarRequest) -> Result<Car, ServiceError> {
        validate_car_request(req)?;
        let car = with_write_deadline(
            "create_car",
            self.config.operation_timeout,
            self.store.create_car(req),
        )
        .await?;

        info!(car_id = %car.id, "car created");
        Ok(car)
    }

    #[instrument(skip(self, req), fields(engine_id = %req.engine.engine_id))]
    pub async fn update_car(&self, id: Uuid, req: &CarRequest) -> Result<Car, ServiceError> {
        validate_car_request(req)?;
        with_write_deadline(
            "update_car",
            self.config.operation_timeout,
            self.store.update_car(id, req),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_car(&self, id: Uuid) -> Result<Car, ServiceError> {
        let car = with_write_deadline(
            "delete_car",
            self.config.operation_timeout,
            self.store.delete_car(id),
        )
        .await?;

        info!(car_id = %id, "car deleted");
        Ok(car)
    }
}
