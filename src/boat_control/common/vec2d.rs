use num::traits::real::Real;
use num::traits::{Num, NumCast};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 2D vector generic over any numeric type.
///
/// Used both for plane vectors (forces, unit headings) and for geographic
/// positions, where `x` holds latitude and `y` holds longitude.
///
/// # Type Parameters
/// * `T` - The functionality for the vector depends on traits implemented by `T`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Vec2D<T> {
    /// The x-component of the vector.
    x: T,
    /// The y-component of the vector.
    y: T,
}

impl<T: Copy> Vec2D<T> {
    /// Creates a new vector with the given x and y components.
    pub const fn new(x: T, y: T) -> Self { Self { x, y } }

    /// Returns the x-component of the vector.
    pub const fn x(&self) -> T { self.x }

    /// Returns the y-component of the vector.
    pub const fn y(&self) -> T { self.y }
}

impl<T> Vec2D<T>
where T: Real + NumCast
{
    /// Computes the magnitude (absolute value) of the vector.
    pub fn abs(&self) -> T { (self.x.powi(2) + self.y.powi(2)).sqrt() }

    /// Creates a vector pointing from the current vector (`self`) to another vector (`other`).
    pub fn to(&self, other: &Vec2D<T>) -> Vec2D<T> {
        Vec2D::new(other.x - self.x, other.y - self.y)
    }

    /// Normalizes the vector to have a magnitude of 1.
    /// If the magnitude is zero, the original vector is returned unmodified.
    pub fn normalize(self) -> Self {
        let magnitude = self.abs();
        if magnitude.is_zero() {
            self
        } else {
            Self::new(self.x / magnitude, self.y / magnitude)
        }
    }

    /// Computes the dot product with another vector.
    pub fn dot(&self, other: &Self) -> T { self.x * other.x + self.y * other.y }

    /// Computes the Euclidean distance between the current vector and another vector.
    pub fn euclid_distance(&self, other: &Self) -> T {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Builds the unit vector pointing along a compass heading, with north as
    /// +x and east as +y, so `from_heading(0)` is `(1, 0)` and
    /// `from_heading(90)` is `(0, 1)`.
    pub fn from_heading(heading_deg: T) -> Self {
        let rad = heading_deg.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    /// The compass heading this vector points along, in `[0, 360)` degrees.
    pub fn heading(&self) -> T {
        let deg = self.y.atan2(self.x).to_degrees();
        let full = T::from(360.0).unwrap();
        (deg + full) % full
    }
}

impl<T: Num + Copy> Add for Vec2D<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl<T: Num + Copy> Sub for Vec2D<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Self::new(self.x - rhs.x, self.y - rhs.y) }
}

impl<T: Num + Copy> Mul<T> for Vec2D<T> {
    type Output = Self;
    fn mul(self, rhs: T) -> Self { Self::new(self.x * rhs, self.y * rhs) }
}

impl<T: Copy> From<(T, T)> for Vec2D<T> {
    fn from(value: (T, T)) -> Self { Self::new(value.0, value.1) }
}

impl<T: fmt::Display> fmt::Display for Vec2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
