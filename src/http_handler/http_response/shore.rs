use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Shoreline metadata around the queried position: the land points the
/// onboard distance recomputation runs against.
#[derive(serde::Deserialize, Debug)]
pub struct ShoreDataResponse {
    points: Vec<ShorePoint>,
}

impl SerdeJSONBodyHTTPResponseType for ShoreDataResponse {}

impl ShoreDataResponse {
    pub fn points(&self) -> &[ShorePoint] { &self.points }
}

#[derive(serde::Deserialize, Debug, Clone, Copy)]
pub struct ShorePoint {
    lat: f64,
    lng: f64,
}

impl ShorePoint {
    pub fn lat(&self) -> f64 { self.lat }
    pub fn lng(&self) -> f64 { self.lng }
}
