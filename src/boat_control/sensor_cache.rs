use super::common::math::get_distance;
use super::common::vec2d::Vec2D;
use super::registry::BoatRegistry;
use super::sensor::{Sensor, SensorKind, WindVector};
use crate::http_handler::http_client::HTTPClient;
use crate::http_handler::http_request::request_common::NoBodyHTTPRequestType;
use crate::http_handler::http_request::shore_get::ShoreDataRequest;
use crate::http_handler::http_request::wind_get::WindDataRequest;
use crate::warn;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

/// Throttled access to the rate-limited external sensor feeds, keyed by
/// the boat's current position. The providers bill per call; the boat
/// barely moves between most of them.
pub struct SensorCache {
    registry: Arc<BoatRegistry>,
    wind_client: HTTPClient,
    shore_client: HTTPClient,
    wind_api_key: String,
    shore_api_key: String,
    last_wind_fetch: Option<(DateTime<Utc>, Vec2D<f64>)>,
    alternate: bool,
}

/// Whether a wind fetch at `pos` is due: always without a prior fetch,
/// otherwise only once the boat moved far enough, and never more often
/// than the interval cap allows.
pub(crate) fn wind_fetch_due(
    last_fetch: Option<(DateTime<Utc>, Vec2D<f64>)>,
    pos: &Vec2D<f64>,
    now: DateTime<Utc>,
) -> bool {
    let Some((fetched_at, fetched_pos)) = last_fetch else {
        return true;
    };
    if now - fetched_at < TimeDelta::seconds(SensorCache::WIND_REFETCH_SECS) {
        return false;
    }
    get_distance(&fetched_pos, pos) >= SensorCache::WIND_REFETCH_DISTANCE
}

impl SensorCache {
    /// Movement below this distance does not justify a wind re-fetch.
    pub const WIND_REFETCH_DISTANCE: f64 = 25.0;
    /// Hard cap between wind fetches, movement or not.
    pub(crate) const WIND_REFETCH_SECS: i64 = 30;

    pub fn new(
        registry: Arc<BoatRegistry>,
        wind_url: &str,
        wind_api_key: &str,
        shore_url: &str,
        shore_api_key: &str,
    ) -> Self {
        Self {
            registry,
            wind_client: HTTPClient::new(wind_url),
            shore_client: HTTPClient::new(shore_url),
            wind_api_key: String::from(wind_api_key),
            shore_api_key: String::from(shore_api_key),
            last_wind_fetch: None,
            alternate: false,
        }
    }

    /// Refreshes the wind sensor from the weather provider, throttled.
    /// Returns the new reading when one was fetched.
    pub async fn refresh_wind(&mut self) -> Option<WindVector> {
        let pos = self.registry.position().await?;
        if !wind_fetch_due(self.last_wind_fetch, &pos, Utc::now()) {
            return None;
        }

        let request = WindDataRequest {
            lat: pos.x(),
            lon: pos.y(),
            api_key: self.wind_api_key.clone(),
        };
        match request.send_request(&self.wind_client).await {
            Ok(response) => {
                self.last_wind_fetch = Some((Utc::now(), pos));
                let vector = WindVector {
                    bearing: response.wind().direction(),
                    speed: response.wind().speed(),
                };
                if let Some(lock) = self.registry.sensor_by_kind(SensorKind::Wind) {
                    if let Sensor::Wind(wind) = &mut *lock.write().await {
                        wind.apply_reading(response.wind(), response.observed_at());
                    }
                }
                Some(vector)
            }
            Err(e) => {
                warn!("Wind fetch failed: {e}");
                None
            }
        }
    }

    /// Refreshes the cached shoreline metadata. The parity flag alternates
    /// between the provider's two data partitions; what it selects is the
    /// provider's business, it just has to keep alternating.
    pub async fn refresh_shoreline(&mut self) {
        let Some(pos) = self.registry.position().await else { return };
        let Some(heading) = self.registry.heading().await else { return };

        let request = ShoreDataRequest {
            lat: pos.x(),
            lng: pos.y(),
            heading,
            alternate: self.alternate,
            api_key: self.shore_api_key.clone(),
        };
        match request.send_request(&self.shore_client).await {
            Ok(response) => {
                self.alternate = !self.alternate;
                if let Some(lock) = self.registry.sensor_by_kind(SensorKind::Shore) {
                    if let Sensor::Shore(shore) = &mut *lock.write().await {
                        shore.apply_shoreline(&response);
                    }
                }
            }
            Err(e) => {
                warn!("Shoreline fetch failed: {e}");
            }
        }
    }

    /// Recomputes shore distances from the cached shoreline, without any
    /// provider round-trip.
    pub async fn recompute_shore_distance(&self) {
        let Some(pos) = self.registry.position().await else { return };
        let Some(heading) = self.registry.heading().await else { return };
        let Some(lock) = self.registry.sensor_by_kind(SensorKind::Shore) else { return };
        if let Sensor::Shore(shore) = &mut *lock.write().await {
            shore.recompute_distance(&pos, heading);
        }
    }

    pub fn alternate(&self) -> bool { self.alternate }
}
