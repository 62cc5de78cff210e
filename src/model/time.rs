//! Continuous-time quantities shared by the analyzer and the simulator.
//!
//! The analytical side of this crate reasons over arbitrary positive reals
//! (task periods, deadlines, response times, ...), not fixed-width integer
//! ticks, so `Seconds` wraps an `f64` rather than the discrete nanosecond
//! counter used elsewhere in this crate's lineage. All comparisons that need
//! to tolerate floating-point noise go through [`EPSILON`].

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Sub};

/// Tolerance used for every `≤`/`≥`/equality test involving demand and supply.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Seconds(pub f64);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0.0);

    pub fn new(value: f64) -> Self {
        Seconds(value)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn infinity() -> Self {
        Seconds(f64::INFINITY)
    }

    pub fn le_eps(&self, other: Seconds) -> bool {
        self.0 <= other.0 + EPSILON
    }

    pub fn ge_eps(&self, other: Seconds) -> bool {
        self.0 + EPSILON >= other.0
    }

    pub fn approx_eq(&self, other: Seconds) -> bool {
        (self.0 - other.0).abs() < EPSILON
    }

    pub fn max(self, other: Seconds) -> Seconds {
        Seconds(self.0.max(other.0))
    }

    pub fn min(self, other: Seconds) -> Seconds {
        Seconds(self.0.min(other.0))
    }

    /// `⌊self / other⌋`, as used throughout the DBF/SBF formulas.
    pub fn div_floor(&self, other: Seconds) -> i64 {
        (self.0 / other.0).floor() as i64
    }

    /// `⌈self / other⌉`, as used for fixed-priority interference sums.
    pub fn div_ceil(&self, other: Seconds) -> i64 {
        (self.0 / other.0).ceil() as i64
    }
}

impl Default for Seconds {
    fn default() -> Self {
        Seconds::ZERO
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Seconds(value)
    }
}

impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0
    }
}

impl Add for Seconds {
    type Output = Seconds;
    fn add(self, rhs: Self) -> Self::Output {
        Seconds(self.0 + rhs.0)
    }
}

impl Sub for Seconds {
    type Output = Seconds;
    fn sub(self, rhs: Self) -> Self::Output {
        Seconds(self.0 - rhs.0)
    }
}

impl Mul<f64> for Seconds {
    type Output = Seconds;
    fn mul(self, rhs: f64) -> Self::Output {
        Seconds(self.0 * rhs)
    }
}

impl Mul<Seconds> for f64 {
    type Output = Seconds;
    fn mul(self, rhs: Seconds) -> Self::Output {
        Seconds(self * rhs.0)
    }
}

impl Mul<i64> for Seconds {
    type Output = Seconds;
    fn mul(self, rhs: i64) -> Self::Output {
        Seconds(self.0 * rhs as f64)
    }
}

impl Div<f64> for Seconds {
    type Output = Seconds;
    fn div(self, rhs: f64) -> Self::Output {
        Seconds(self.0 / rhs)
    }
}

impl Div for Seconds {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Sum for Seconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Seconds::ZERO, |acc, val| acc + val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_floor_and_ceil_match_spec_formulas() {
        let t = Seconds(9.0);
        let d = Seconds(4.0);
        assert_eq!(t.div_floor(d), 2);
        assert_eq!(t.div_ceil(d), 3);
    }
}
