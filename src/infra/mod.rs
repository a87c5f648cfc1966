//! Concrete source clients.

pub mod google;
pub mod open_meteo;
