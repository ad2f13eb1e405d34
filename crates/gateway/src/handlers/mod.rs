//! API handlers module

pub mod data;
pub mod export;
pub mod health;
pub mod params;
pub mod search;
pub mod upload;
