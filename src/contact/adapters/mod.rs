//! Adapter implementations of the contact store port.

pub mod dynamodb;
pub mod factory;
pub mod memory;
pub mod postgres;
