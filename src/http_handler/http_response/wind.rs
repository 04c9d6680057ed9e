use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Current-weather answer from the wind provider; only the wind block and
/// the observation timestamp are consumed.
#[derive(serde::Deserialize, Debug)]
pub struct WindDataResponse {
    wind: WindReading,
    #[serde(default)]
    dt: Option<i64>,
}

impl SerdeJSONBodyHTTPResponseType for WindDataResponse {}

impl WindDataResponse {
    pub fn wind(&self) -> &WindReading { &self.wind }
    pub fn observed_at(&self) -> Option<i64> { self.dt }
}

/// Wind bearing in degrees, speeds in m/s. Providers omit fields they have
/// no reading for, absent values default to calm.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct WindReading {
    #[serde(default)]
    deg: f64,
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    gust: Option<f64>,
}

impl WindReading {
    pub fn direction(&self) -> f64 { self.deg }
    pub fn speed(&self) -> f64 { self.speed }
    pub fn gust(&self) -> Option<f64> { self.gust }
}
