pub mod boat_config;
pub mod health;
pub mod response_common;
pub mod shore;
pub mod wind;
