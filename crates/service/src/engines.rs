//! Engine service.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use db::EngineStore;
use domain::{validate_engine_request, Engine, EngineRequest};

use crate::{with_deadline, with_write_deadline, ServiceConfig, ServiceError};

/// Validates engine writes and forwards them to an [`EngineStore`].
#[derive(Clone)]
pub struct EngineService {
    store: Arc<dyn EngineStore>,
    config: ServiceConfig,
}

impl EngineService {
    pub fn new(store: Arc<dyn EngineStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self))]
    pub async fn get_engine_by_id(&self, id: Uuid) -> Result<Engine, ServiceError> {
        with_deadline(
            "get_engine_by_id",
            self.config.operation_timeout,
            self.store.get_engine_by_id(id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn create_engine(&self, req: &EngineRequest) -> Result<Engine, ServiceError> {
        validate_engine_request(req)?;
        let engine = with_write_deadline(
            "create_engine",
            self.config.operation_timeout,
            self.store.create_engine(req),
        )
        .await?;

        info!(engine_id = %engine.engine_id, "engine created");
        Ok(engine)
    }

    #[instrument(skip(self))]
    pub async fn update_engine(&self, id: Uuid, req: &EngineRequest) -> Result<Engine, ServiceError> {
        validate_engine_request(req)?;
        with_write_deadline(
            "update_engine",
            self.config.operation_timeout,
            self.store.update_engine(id, req),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_engine(&self, id: Uuid) -> Result<Engine, ServiceError> {
        let engine = with_write_deadline(
            "delete_engine",
            self.config.operation_timeout,
            self.store.delete_engine(id),
        )
        .await?;

        info!(engine_id = %id, "engine deleted");
        Ok(engine)
    }
}
