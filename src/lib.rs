pub mod config;
pub mod driver;
pub mod fetch;
pub mod infra;
pub mod merge;
pub mod model;
pub mod services;
pub mod store;
