//! 基础设施层

pub mod logger;

#[cfg(feature = "database")]
pub mod database;
#[cfg(feature = "database")]
pub mod product_repository;
