//! Core value types shared across the crate

use std::{
    fmt,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// A 2D vector used for positions, velocities and drift directions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Positions live in the same space as velocities.
pub type Position = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from the x axis.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).norm()
    }

    /// Heading angle in radians, in (-π, π].
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Counter-clockwise perpendicular `[-y, x]`.
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn rotate(self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(cos * self.x - sin * self.y, sin * self.x + cos * self.y)
    }

    /// Unit vector in the same direction, or `None` for a zero/non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() {
            Some(self * (1.0 / norm))
        } else {
            None
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A straight wall segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
}

impl Wall {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Shortest vector from the wall segment to `point`.
    pub fn vector_to(&self, point: Vec2) -> Vec2 {
        let s = self.direction();
        let len_sq = s.dot(s);
        let l = if len_sq > 0.0 {
            ((point - self.start).dot(s) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        point - (self.start + s * l)
    }

    /// Whether the segment `from -> to` strictly crosses this wall.
    pub fn intersects_step(&self, from: Vec2, to: Vec2) -> bool {
        let sa = self.direction();
        let sb = to - from;
        let d0 = from - self.start;
        let denom_a = sa.dot(sb.perpendicular());
        let denom_b = sb.dot(sa.perpendicular());
        if denom_a == 0.0 || denom_b == 0.0 {
            // parallel segments never cross
            return false;
        }
        let l_a = d0.dot(sb.perpendicular()) / denom_a;
        let l_b = (-d0).dot(sa.perpendicular()) / denom_b;
        l_a > 0.0 && l_a < 1.0 && l_b > 0.0 && l_b < 1.0
    }

    /// Distance along the ray `origin + t·direction`, `t > 0`, at which it
    /// meets this wall. `direction` is expected to be a unit vector.
    pub fn ray_distance(&self, origin: Vec2, direction: Vec2) -> Option<f64> {
        let sa = self.direction();
        let d0 = origin - self.start;
        let denom_a = sa.dot(direction.perpendicular());
        let denom_b = direction.dot(sa.perpendicular());
        if denom_a == 0.0 || denom_b == 0.0 {
            return None;
        }
        let along_wall = d0.dot(direction.perpendicular()) / denom_a;
        let along_ray = (-d0).dot(sa.perpendicular()) / denom_b;
        (along_ray > 0.0 && (0.0..=1.0).contains(&along_wall)).then_some(along_ray)
    }

    /// Reflect `velocity` off this wall.
    pub fn bounce(&self, velocity: Vec2) -> Vec2 {
        let mut perp = self.direction().perpendicular();
        if perp.dot(velocity) <= 0.0 {
            perp = -perp;
        }
        let mut par = self.direction();
        if par.dot(velocity) <= 0.0 {
            par = -par;
        }
        let (Some(par), Some(perp)) = (par.normalized(), perp.normalized()) else {
            return -velocity;
        };
        par * velocity.dot(par) - perp * velocity.dot(perp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_across_wall_is_detected() {
        let wall = Wall::new(Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0));
        assert!(wall.intersects_step(Vec2::new(0.4, 0.5), Vec2::new(0.6, 0.5)));
        assert!(!wall.intersects_step(Vec2::new(0.1, 0.5), Vec2::new(0.3, 0.5)));
    }

    #[test]
    fn bounce_flips_normal_component() {
        let wall = Wall::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let bounced = wall.bounce(Vec2::new(0.3, -0.4));
        assert!((bounced.x - 0.3).abs() < 1e-12);
        assert!((bounced.y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn vector_to_clamps_to_segment_end() {
        let wall = Wall::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let v = wall.vector_to(Vec2::new(2.0, 1.0));
        assert_eq!(v, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn ray_distance_only_looks_forward() {
        let wall = Wall::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0));
        let origin = Vec2::new(0.25, 0.5);
        let hit = wall.ray_distance(origin, Vec2::new(1.0, 0.0)).unwrap();
        assert!((hit - 0.75).abs() < 1e-12);
        assert!(wall.ray_distance(origin, Vec2::new(-1.0, 0.0)).is_none());
        assert!(wall.ray_distance(origin, Vec2::new(0.0, 1.0)).is_none());
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(Vec2::ZERO.normalized().is_none());
    }
}
