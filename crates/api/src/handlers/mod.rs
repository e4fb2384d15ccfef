//! Route handlers, one module per resource.

pub mod cars;
pub mod engines;
pub mod health;
pub mod login;
