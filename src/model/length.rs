//! Length measures used for page geometry and font sizes.
//!
//! Lengths are stored in English Metric Units (EMU). WordprocessingML writes
//! page geometry in twips (1/20 pt) and font sizes in half-points, so the
//! conversions round to the nearest whole unit on the way out.

use serde::{Deserialize, Serialize};

const EMU_PER_INCH: i64 = 914_400;
const EMU_PER_CM: i64 = 360_000;
const EMU_PER_PT: i64 = 12_700;
const EMU_PER_TWIP: i64 = 635;
const EMU_PER_HALF_POINT: i64 = 6_350;

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Length(i64);

impl Length {
    /// Create a length from raw EMUs.
    pub const fn emu(emu: i64) -> Self {
        Self(emu)
    }

    /// Create a length from centimeters.
    pub fn cm(cm: f64) -> Self {
        Self((cm * EMU_PER_CM as f64).round() as i64)
    }

    /// Create a length from points.
    pub fn pt(pt: f64) -> Self {
        Self((pt * EMU_PER_PT as f64).round() as i64)
    }

    /// Create a length from inches.
    pub fn inches(inches: f64) -> Self {
        Self((inches * EMU_PER_INCH as f64).round() as i64)
    }

    /// Create a length from twips.
    pub const fn from_twips(twips: i64) -> Self {
        Self(twips * EMU_PER_TWIP)
    }

    /// Create a length from half-points (the unit of `w:sz`).
    pub const fn from_half_points(half_points: i64) -> Self {
        Self(half_points * EMU_PER_HALF_POINT)
    }

    /// Raw EMU value.
    pub const fn as_emu(&self) -> i64 {
        self.0
    }

    /// Value in twips, rounded.
    pub fn twips(&self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP as f64).round() as i64
    }

    /// Value in half-points, rounded.
    pub fn half_points(&self) -> i64 {
        (self.0 as f64 / EMU_PER_HALF_POINT as f64).round() as i64
    }

    /// Value in centimeters.
    pub fn as_cm(&self) -> f64 {
        self.0 as f64 / EMU_PER_CM as f64
    }

    /// Value in points.
    pub fn as_pt(&self) -> f64 {
        self.0 as f64 / EMU_PER_PT as f64
    }
}
