use super::common::vec2d::Vec2D;
use serde_json::Value;

/// Target coordinate the autopilot steers toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayPoint {
    lat: f64,
    lng: f64,
}

impl WayPoint {
    pub const fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

    pub fn lat(&self) -> f64 { self.lat }

    pub fn lng(&self) -> f64 { self.lng }

    pub fn pos(&self) -> Vec2D<f64> { Vec2D::new(self.lat, self.lng) }

    /// Parses an operator waypoint payload: a sequence of `{lat, lng}`
    /// objects. Anything else yields `None` and must leave the current
    /// plan untouched.
    pub fn vec_from_payload(payload: &Value) -> Option<Vec<WayPoint>> {
        payload
            .as_array()?
            .iter()
            .map(|point| {
                let lat = point.get("lat")?.as_f64()?;
                let lng = point.get("lng")?.as_f64()?;
                Some(WayPoint::new(lat, lng))
            })
            .collect()
    }
}

/// The active route: an ordered waypoint sequence plus the index the
/// autopilot is currently steering for. Replaced wholesale on operator
/// command; only the index ever advances in place.
#[derive(Debug, Default)]
pub struct NavigationPlan {
    way_points: Vec<WayPoint>,
    index: usize,
    complete: bool,
}

impl NavigationPlan {
    pub fn replace(&mut self, way_points: Vec<WayPoint>) {
        self.way_points = way_points;
        self.index = 0;
        self.complete = false;
    }

    pub fn clear(&mut self) {
        self.way_points.clear();
        self.index = 0;
        self.complete = false;
    }

    /// The waypoint currently steered for.
    pub fn current(&self) -> Option<&WayPoint> {
        if self.complete {
            return None;
        }
        self.way_points.get(self.index)
    }

    /// Advances past the current waypoint. Returns true when the plan is
    /// thereby exhausted.
    pub fn advance(&mut self) -> bool {
        self.index += 1;
        if self.index >= self.way_points.len() {
            self.complete = true;
        }
        self.complete
    }

    pub fn index(&self) -> usize { self.index }

    pub fn len(&self) -> usize { self.way_points.len() }

    pub fn is_empty(&self) -> bool { self.way_points.is_empty() }

    pub fn is_complete(&self) -> bool { self.complete }

    pub fn way_points(&self) -> &[WayPoint] { &self.way_points }
}
