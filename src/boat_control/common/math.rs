use super::vec2d::Vec2D;

/// Mean earth radius in meters, used by [`get_distance`].
const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Meters per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Wraps a heading into `[0, 360)` degrees.
pub fn wrap_heading(deg: f64) -> f64 { deg.rem_euclid(360.0) }

/// Reduces an angle difference to its signed equivalent in `[-180, 180]`.
///
/// This is the wraparound-safe form of "smallest rotation from a to b":
/// `signed_angle(350.0 - 10.0)` is `-20.0`, not `340.0`.
pub fn signed_angle(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Great-circle distance between two geographic positions (`x` latitude,
/// `y` longitude, degrees) in meters.
pub fn get_distance(a: &Vec2D<f64>, b: &Vec2D<f64>) -> f64 {
    let lat_a = a.x().to_radians();
    let lat_b = b.x().to_radians();
    let d_lat = (b.x() - a.x()).to_radians();
    let d_lng = (b.y() - a.y()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial compass bearing from `a` towards `b`, in `[0, 360)` degrees.
pub fn bearing_between(a: &Vec2D<f64>, b: &Vec2D<f64>) -> f64 {
    let lat_a = a.x().to_radians();
    let lat_b = b.x().to_radians();
    let d_lng = (b.y() - a.y()).to_radians();
    let y = d_lng.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lng.cos();
    wrap_heading(y.atan2(x).to_degrees())
}

/// Moves a geographic position by `dist_m` meters along a compass heading.
///
/// Flat-earth approximation, fine for the few meters a vessel covers per
/// integration step.
pub fn offset_position(pos: &Vec2D<f64>, heading_deg: f64, dist_m: f64) -> Vec2D<f64> {
    let rad = heading_deg.to_radians();
    let d_lat = dist_m * rad.cos() / METERS_PER_DEG_LAT;
    let meters_per_deg_lng = METERS_PER_DEG_LAT * pos.x().to_radians().cos();
    let d_lng = if meters_per_deg_lng.abs() < f64::EPSILON {
        0.0
    } else {
        dist_m * rad.sin() / meters_per_deg_lng
    };
    Vec2D::new(pos.x() + d_lat, pos.y() + d_lng)
}
