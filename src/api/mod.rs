//! API handlers for Labtrack REST endpoints

pub mod equipment;
pub mod health;
pub mod openapi;
pub mod records;
pub mod transactions;
