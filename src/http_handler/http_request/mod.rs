pub mod boat_config_get;
pub mod health_get;
pub mod request_common;
pub mod shore_get;
pub mod wind_get;
