//! `MemoryStore`: an in-process implementation of both store traits.
//!
//! Mirrors the Postgres stores' semantics (not-found, missing engine
//! reference, blocked engine delete, insertion-order brand listing) so the
//! service and HTTP layers can be exercised without a database.  Each
//! operation takes the lock once and never holds it across an `.await`,
//! which makes every write all-or-nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use domain::{Car, CarRequest, Engine, EngineRequest};

use crate::{CarStore, DbError, EngineStore};

#[derive(Debug, Default)]
struct Tables {
    engines: HashMap<Uuid, Engine>,
    /// Insertion order is the listing order.  `engine` is never stored; it
    /// is joined on read.
    cars: Vec<Car>,
}

impl Tables {
    fn engine(&self, id: Uuid) -> Option<&Engine> {
        self.engines.get(&id)
    }

    fn car_index(&self, id: Uuid) -> Option<usize> {
        self.cars.iter().position(|c| c.id == id)
    }

    fn joined(&self, car: &Car) -> Car {
        Car {
            engine: self.engine(car.engine_id).cloned(),
            ..car.clone()
        }
    }

    fn referencing_cars(&self, engine_id: Uuid) -> i64 {
        self.cars.iter().filter(|c| c.engine_id == engine_id).count() as i64
    }
}

/// Shared, cloneable in-memory store.  Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of engine rows.
    pub fn engine_count(&self) -> usize {
        self.lock().engines.len()
    }

    /// Number of car rows.
    pub fn car_count(&self) -> usize {
        self.lock().cars.len()
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn get_engine_by_id(&self, id: Uuid) -> Result<Engine, DbError> {
        self.lock()
            .engine(id)
            .cloned()
            .ok_or(DbError::NotFound { entity: "engine", id })
    }

    async fn create_engine(&self, req: &EngineRequest) -> Result<Engine, DbError> {
        let engine = req.clone().into_engine(Uuid::new_v4());
        self.lock().engines.insert(engine.engine_id, engine.clone());
        Ok(engine)
    }

    async fn update_engine(&self, id: Uuid, req: &EngineRequest) -> Result<Engine, DbError> {
        let mut tables = self.lock();
        let slot = tables
            .engines
            .get_mut(&id)
            .ok_or(DbError::NotFound { entity: "engine", id })?;
        *slot = req.clone().into_engine(id);
        Ok(slot.clone())
    }

    async fn delete_engine(&self, id: Uuid) -> Result<Engine, DbError> {
        let mut tables = self.lock();
        if tables.engine(id).is_none() {
            return Err(DbError::NotFound { entity: "engine", id });
        }
        let cars = tables.referencing_cars(id);
        if cars > 0 {
            return Err(DbError::EngineInUse { id, cars });
        }
        tables
            .engines
            .remove(&id)
            .ok_or(DbError::NoRowDeleted { entity: "engine", id })
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn get_car_by_id(&self, id: Uuid) -> Result<Car, DbError> {
        let tables = self.lock();
        let idx = tables.car_index(id).ok_or(DbError::NotFound { entity: "car", id })?;
        Ok(tables.joined(&tables.cars[idx]))
    }

    async fn get_cars_by_brand(&self, brand: &str, include_engine: bool) -> Result<Vec<Car>, DbError> {
        let tables = self.lock();
        Ok(tables
            .cars
            .iter()
            .filter(|c| c.brand == brand)
            .map(|c| if include_engine { tables.joined(c) } else { c.clone() })
            .collect())
    }

    async fn create_car(&self, req: &CarRequest) -> Result<Car, DbError> {
        let mut tables = self.lock();
        let engine_id = req.engine.engine_id;
        if tables.engine(engine_id).is_none() {
            return Err(DbError::MissingReference { entity: "engine", id: engine_id });
        }

        let now = Utc::now();
        let car = Car {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            year: req.year.clone(),
            brand: req.brand.clone(),
            fuel_type: req.fuel_type.clone(),
            price: req.price,
            engine_id,
            engine: None,
            created_at: now,
            updated_at: now,
        };
        tables.cars.push(car.clone());
        Ok(tables.joined(&car))
    }

    async fn update_car(&self, id: Uuid, req: &CarRequest) -> Result<Car, DbError> {
        let mut tables = self.lock();
        let idx = tables.car_index(id).ok_or(DbError::NotFound { entity: "car", id })?;
        let engine_id = req.engine.engine_id;
        if tables.engine(engine_id).is_none() {
            return Err(DbError::MissingReference { entity: "engine", id: engine_id });
        }

        let car = &mut tables.cars[idx];
        car.name = req.name.clone();
        car.year = req.year.clone();
        car.brand = req.brand.clone();
        car.fuel_type = req.fuel_type.clone();
        car.price = req.price;
        car.engine_id = engine_id;
        car.updated_at = Utc::now();

        let updated = car.clone();
        Ok(tables.joined(&updated))
    }

    async fn delete_car(&self, id: Uuid) -> Result<Car, DbError> {
        let mut tables = self.lock();
        let idx = tables.car_index(id).ok_or(DbError::NotFound { entity: "car", id })?;
        let car = tables.joined(&tables.cars[idx]);
        tables.cars.remove(idx);
        Ok(car)
    }
}
