use super::common::math::{bearing_between, get_distance, signed_angle};
use super::common::vec2d::Vec2D;
use crate::http_handler::http_response::shore::ShoreDataResponse;
use crate::http_handler::http_response::wind::WindReading;
use serde_json::{Value, json};
use strum_macros::{Display, EnumString};

/// The closed set of sensor roles on board. Unknown type tags in the boat
/// definition are skipped at registry build time, not represented here.
#[derive(Debug, Display, EnumString, PartialEq, Eq, Clone, Copy, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum SensorKind {
    Gps,
    Bno,
    Wind,
    Shore,
    Bandwidth,
    Ip,
}

/// Ambient wind as last observed: the compass bearing the wind comes from
/// and its speed in m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    pub bearing: f64,
    pub speed: f64,
}

/// One installed sensor. A closed tagged variant per role with a shared
/// capability surface (`name`, `kind`, `meta`, `has_changed`) plus typed
/// accessors that return `None` for every variant the reading does not
/// apply to — a missing reading is an expected outcome, not an error.
pub enum Sensor {
    Gps(GpsSensor),
    Bno(BnoSensor),
    Wind(WindSensor),
    Shore(ShoreSensor),
    Bandwidth(BandwidthSensor),
    Ip(IpSensor),
}

impl Sensor {
    pub fn name(&self) -> &str {
        match self {
            Sensor::Gps(s) => &s.name,
            Sensor::Bno(s) => &s.name,
            Sensor::Wind(s) => &s.name,
            Sensor::Shore(s) => &s.name,
            Sensor::Bandwidth(s) => &s.name,
            Sensor::Ip(s) => &s.name,
        }
    }

    pub fn kind(&self) -> SensorKind {
        match self {
            Sensor::Gps(_) => SensorKind::Gps,
            Sensor::Bno(_) => SensorKind::Bno,
            Sensor::Wind(_) => SensorKind::Wind,
            Sensor::Shore(_) => SensorKind::Shore,
            Sensor::Bandwidth(_) => SensorKind::Bandwidth,
            Sensor::Ip(_) => SensorKind::Ip,
        }
    }

    /// The observable state sent out as telemetry.
    pub fn meta(&self) -> Value {
        match self {
            Sensor::Gps(s) => json!({"lat": s.lat, "lng": s.lng, "speed": s.speed_mps}),
            Sensor::Bno(s) => json!({"heading": s.heading}),
            Sensor::Wind(s) => {
                json!({"direction": s.direction, "speed": s.speed, "gust": s.gust, "time": s.observed_at})
            }
            Sensor::Shore(s) => {
                json!({"distance": s.distance_m, "ahead": s.ahead_m, "points": s.shoreline.len()})
            }
            Sensor::Bandwidth(s) => json!({"rtt_ms": s.rtt_ms}),
            Sensor::Ip(s) => json!({"ip": s.address}),
        }
    }

    /// Compares the current observable state against the one reported last
    /// time; true exactly once per distinct state.
    pub fn has_changed(&mut self) -> bool {
        let meta = self.meta();
        let prev = match self {
            Sensor::Gps(s) => &mut s.prev_meta,
            Sensor::Bno(s) => &mut s.prev_meta,
            Sensor::Wind(s) => &mut s.prev_meta,
            Sensor::Shore(s) => &mut s.prev_meta,
            Sensor::Bandwidth(s) => &mut s.prev_meta,
            Sensor::Ip(s) => &mut s.prev_meta,
        };
        let changed = *prev != meta;
        *prev = meta;
        changed
    }

    /// Geographic position, if this is a position sensor with a fix.
    pub fn position(&self) -> Option<Vec2D<f64>> {
        match self {
            Sensor::Gps(s) => Some(Vec2D::new(s.lat?, s.lng?)),
            _ => None,
        }
    }

    /// Compass heading in degrees, if this is an orientation sensor with a
    /// reading.
    pub fn heading(&self) -> Option<f64> {
        match self {
            Sensor::Bno(s) => s.heading,
            _ => None,
        }
    }

    /// Ambient wind, if this is a wind sensor.
    pub fn wind(&self) -> Option<WindVector> {
        match self {
            Sensor::Wind(s) => Some(WindVector { bearing: s.direction, speed: s.speed }),
            _ => None,
        }
    }

    /// Distance to the nearest known land in meters, if this is a shore
    /// sensor with cached shoreline data.
    pub fn shore_distance(&self) -> Option<f64> {
        match self {
            Sensor::Shore(s) => s.distance_m,
            _ => None,
        }
    }
}

/// Position sensor. On hardware the fix comes in over the configured
/// serial channel; in simulation mode the simulation engine feeds it. An
/// assisted fix (`init_agps`) seeds the position either way.
pub struct GpsSensor {
    name: String,
    channel: Option<String>,
    simulated: bool,
    lat: Option<f64>,
    lng: Option<f64>,
    speed_mps: f64,
    prev_meta: Value,
}

impl GpsSensor {
    pub fn new(name: &str, channel: Option<&str>, simulated: bool) -> Self {
        Self {
            name: String::from(name),
            channel: channel.map(String::from),
            simulated,
            lat: None,
            lng: None,
            speed_mps: 0.0,
            prev_meta: Value::Null,
        }
    }

    pub fn channel(&self) -> Option<&str> { self.channel.as_deref() }

    /// Seeds an assisted fix, used to shortcut a cold start.
    pub fn init_agps(&mut self, lat: f64, lon: f64) {
        self.lat = Some(lat);
        self.lng = Some(lon);
    }

    /// Simulation feed; a no-op when real hardware owns the fix.
    pub fn set_sim_fix(&mut self, pos: Vec2D<f64>, speed_mps: f64) {
        if !self.simulated {
            return;
        }
        self.lat = Some(pos.x());
        self.lng = Some(pos.y());
        self.speed_mps = speed_mps;
    }
}

/// Orientation sensor (IMU fusion chip). Reports the vessel's compass
/// heading; `None` until the first reading arrives.
pub struct BnoSensor {
    name: String,
    simulated: bool,
    heading: Option<f64>,
    prev_meta: Value,
}

impl BnoSensor {
    pub fn new(name: &str, simulated: bool) -> Self {
        Self {
            name: String::from(name),
            simulated,
            heading: None,
            prev_meta: Value::Null,
        }
    }

    /// Simulation feed; a no-op when real hardware owns the heading.
    pub fn set_sim_heading(&mut self, heading: f64) {
        if self.simulated {
            self.heading = Some(heading);
        }
    }
}

/// Wind sensor backed by the external weather provider. Absent readings
/// default to calm, matching what the provider omits.
pub struct WindSensor {
    name: String,
    direction: f64,
    speed: f64,
    gust: Option<f64>,
    observed_at: Option<i64>,
    prev_meta: Value,
}

impl WindSensor {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            direction: 0.0,
            speed: 0.0,
            gust: None,
            observed_at: None,
            prev_meta: Value::Null,
        }
    }

    pub fn apply_reading(&mut self, reading: &WindReading, observed_at: Option<i64>) {
        self.direction = reading.direction();
        self.speed = reading.speed();
        self.gust = reading.gust();
        self.observed_at = observed_at;
    }
}

/// Shore proximity sensor: caches shoreline metadata from the external
/// provider and recomputes distances onboard between refreshes.
pub struct ShoreSensor {
    name: String,
    shoreline: Vec<Vec2D<f64>>,
    distance_m: Option<f64>,
    ahead_m: Option<f64>,
    prev_meta: Value,
}

impl ShoreSensor {
    /// Half-width of the "ahead" cone used for the heading-relative distance.
    const AHEAD_CONE_DEG: f64 = 45.0;

    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            shoreline: Vec::new(),
            distance_m: None,
            ahead_m: None,
            prev_meta: Value::Null,
        }
    }

    pub fn apply_shoreline(&mut self, response: &ShoreDataResponse) {
        self.shoreline =
            response.points().iter().map(|p| Vec2D::new(p.lat(), p.lng())).collect();
    }

    pub fn shoreline(&self) -> &[Vec2D<f64>] { &self.shoreline }

    /// Recomputes the nearest-land distance and the distance to land inside
    /// the forward cone from the cached shoreline points.
    pub fn recompute_distance(&mut self, pos: &Vec2D<f64>, heading: f64) {
        let mut nearest: Option<f64> = None;
        let mut nearest_ahead: Option<f64> = None;
        for point in &self.shoreline {
            let dist = get_distance(pos, point);
            if nearest.is_none_or(|d| dist < d) {
                nearest = Some(dist);
            }
            let off_bow = signed_angle(bearing_between(pos, point) - heading);
            if off_bow.abs() <= Self::AHEAD_CONE_DEG && nearest_ahead.is_none_or(|d| dist < d) {
                nearest_ahead = Some(dist);
            }
        }
        self.distance_m = nearest;
        self.ahead_m = nearest_ahead;
    }
}

/// Link quality sensor: round-trip time of the most recent successful
/// connectivity probe.
pub struct BandwidthSensor {
    name: String,
    rtt_ms: Option<i64>,
    prev_meta: Value,
}

impl BandwidthSensor {
    pub fn new(name: &str) -> Self {
        Self { name: String::from(name), rtt_ms: None, prev_meta: Value::Null }
    }

    pub fn record_rtt(&mut self, rtt_ms: i64) { self.rtt_ms = Some(rtt_ms); }
}

/// Address sensor: the address the boat is reachable under for remote
/// maintenance. Resolved once at startup.
pub struct IpSensor {
    name: String,
    address: Option<String>,
    prev_meta: Value,
}

impl IpSensor {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            address: Self::local_address(),
            prev_meta: Value::Null,
        }
    }

    // Routing-table trick: no packet is sent, the OS just picks the
    // outbound interface for us.
    fn local_address() -> Option<String> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        Some(socket.local_addr().ok()?.ip().to_string())
    }
}
