// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Exact frame/rate time arithmetic
//!
//! All source-media positions in this crate are [`RationalTime`] values: an
//! integer frame count paired with an exact [`FrameRate`]. Two values can only
//! be combined when they share a rate. Mixing rates requires an explicit
//! [`RationalTime::rescale_to`] first, which is also the only place rounding
//! happens.
//!
//! # Rounding
//!
//! Rescaling to a rate that is not an integer multiple of the source rate,
//! and converting seconds into frames, both round the resulting frame count
//! half-to-even (banker's rounding) via [`round_half_even`]. Tolerances,
//! where a bound must never be exceeded, are the one exception and round
//! down ([`RationalTime::floor_seconds`]).
//!
//! # Serialization
//!
//! A [`FrameRate`] is written as a plain fps number when that number reads
//! back to the same fraction (`24`, `12.5`, `23.976`), and as a `"num/den"`
//! string otherwise (`"50/3"`). Both forms are accepted on input.
//!
//! # Example
//!
//! ```rust
//! use mediatrim_core::time::{FrameRate, RationalTime};
//!
//! # fn example() -> mediatrim_core::Result<()> {
//! let fps24 = FrameRate::integer(24)?;
//! let fps48 = FrameRate::integer(48)?;
//!
//! let a = RationalTime::new(10, fps24);
//! let b = RationalTime::new(40, fps48).rescale_to(fps24)?;
//! assert_eq!(a.add(b)?.frames(), 30);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::error::{Result, TrimError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Tolerance used when recognising NTSC (x/1.001) rates from decimal input
const NTSC_TOLERANCE: f64 = 5e-3;

/// Exact frame rate stored as a reduced fraction (frames per second)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FrameRateRepr", into = "FrameRateRepr")]
pub struct FrameRate {
    numerator: u32,
    denominator: u32,
}

impl FrameRate {
    /// Create a rate from a fraction, reducing it to lowest terms
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(TrimError::InvalidFrameRate(format!(
                "{}/{} (both terms must be positive)",
                numerator, denominator
            )));
        }

        let divisor = gcd(numerator, denominator);
        Ok(FrameRate {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    /// Create a whole-number rate such as 24, 25 or 30
    pub fn integer(fps: u32) -> Result<Self> {
        Self::new(fps, 1)
    }

    /// Convert a decimal fps value into an exact rate
    ///
    /// Whole numbers map to `n/1`, NTSC-style values such as `23.976` or
    /// `29.97` map to `n*1000/1001`, and anything else is kept to millisecond
    /// precision.
    pub fn from_fps(fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(TrimError::InvalidFrameRate(format!("{} fps", fps)));
        }
        if fps * 1000.0 > f64::from(u32::MAX) {
            return Err(TrimError::InvalidFrameRate(format!(
                "{} fps is too large",
                fps
            )));
        }

        let rounded = fps.round();
        if (fps - rounded).abs() < 1e-9 {
            return Self::integer(rounded as u32);
        }

        let ntsc = fps * 1.001;
        if (ntsc - ntsc.round()).abs() < NTSC_TOLERANCE && ntsc.round() >= 1.0 {
            if let Some(numerator) = (ntsc.round() as u32).checked_mul(1000) {
                return Self::new(numerator, 1001);
            }
        }

        Self::new((fps * 1000.0).round() as u32, 1000)
    }

    /// Numerator of the reduced fraction
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Denominator of the reduced fraction
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Frames per second as a float, for display and serialization
    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{:.3}", self.as_f64())
        }
    }
}

impl TryFrom<f64> for FrameRate {
    type Error = TrimError;

    fn try_from(fps: f64) -> Result<Self> {
        FrameRate::from_fps(fps)
    }
}

impl From<FrameRate> for f64 {
    fn from(rate: FrameRate) -> f64 {
        rate.as_f64()
    }
}

impl FromStr for FrameRate {
    type Err = TrimError;

    /// Parse `"50/3"` as an exact fraction, anything else as decimal fps
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((numerator, denominator)) = s.split_once('/') {
            let parse = |term: &str| {
                term.trim()
                    .parse::<u32>()
                    .map_err(|_| TrimError::InvalidFrameRate(s.to_string()))
            };
            return FrameRate::new(parse(numerator)?, parse(denominator)?);
        }

        let fps = s
            .parse::<f64>()
            .map_err(|_| TrimError::InvalidFrameRate(s.to_string()))?;
        FrameRate::from_fps(fps)
    }
}

/// Wire form of a [`FrameRate`]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FrameRateRepr {
    Fps(f64),
    Fraction(String),
}

impl From<FrameRate> for FrameRateRepr {
    fn from(rate: FrameRate) -> Self {
        let fps = rate.as_f64();
        match FrameRate::from_fps(fps) {
            Ok(back) if back == rate => FrameRateRepr::Fps(fps),
            _ => FrameRateRepr::Fraction(format!("{}/{}", rate.numerator, rate.denominator)),
        }
    }
}

impl TryFrom<FrameRateRepr> for FrameRate {
    type Error = TrimError;

    fn try_from(repr: FrameRateRepr) -> Result<Self> {
        match repr {
            FrameRateRepr::Fps(fps) => FrameRate::from_fps(fps),
            FrameRateRepr::Fraction(text) => text.parse(),
        }
    }
}

/// An exact `frames / rate` seconds value
///
/// Equality is structural: `10@24` and `20@48` are different values even
/// though they denote the same instant. Use [`RationalTime::cmp_at`] to
/// compare across rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RationalTime {
    frames: i64,
    rate: FrameRate,
}

impl RationalTime {
    /// Create a time value from a frame count at a rate
    pub fn new(frames: i64, rate: FrameRate) -> Self {
        RationalTime { frames, rate }
    }

    /// Zero frames at `rate`
    pub fn zero(rate: FrameRate) -> Self {
        RationalTime { frames: 0, rate }
    }

    /// Convert seconds to the nearest frame at `rate` (half-to-even)
    pub fn from_seconds(seconds: f64, rate: FrameRate) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(TrimError::Overflow(format!("{} seconds", seconds)));
        }

        let frames = (seconds * rate.as_f64()).round_ties_even();
        if frames < i64::MIN as f64 || frames > i64::MAX as f64 {
            return Err(TrimError::Overflow(format!(
                "{} seconds at {} fps",
                seconds, rate
            )));
        }

        Ok(RationalTime::new(frames as i64, rate))
    }

    /// Largest whole frame count at `rate` that does not exceed `seconds`
    ///
    /// Products within `1e-9` of a whole frame count as that frame, so
    /// `0.29 s @ 100 fps` is 29 frames despite float error.
    pub fn floor_seconds(seconds: f64, rate: FrameRate) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(TrimError::Overflow(format!("{} seconds", seconds)));
        }

        let exact = seconds * rate.as_f64();
        let nearest = exact.round();
        let frames = if (exact - nearest).abs() < 1e-9 {
            nearest
        } else {
            exact.floor()
        };
        if frames < i64::MIN as f64 || frames > i64::MAX as f64 {
            return Err(TrimError::Overflow(format!(
                "{} seconds at {} fps",
                seconds, rate
            )));
        }

        Ok(RationalTime::new(frames as i64, rate))
    }

    /// Frame count
    pub fn frames(&self) -> i64 {
        self.frames
    }

    /// Rate the frame count is expressed at
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Value in seconds
    pub fn to_seconds(&self) -> f64 {
        self.frames as f64 * f64::from(self.rate.denominator) / f64::from(self.rate.numerator)
    }

    /// Sum of two values at the same rate
    pub fn add(self, other: RationalTime) -> Result<Self> {
        self.require_same_rate(&other, "add")?;
        let frames = self.frames.checked_add(other.frames).ok_or_else(|| {
            TrimError::Overflow(format!("{} + {}", self, other))
        })?;
        Ok(RationalTime::new(frames, self.rate))
    }

    /// Difference of two values at the same rate, clamped at zero
    pub fn subtract(self, other: RationalTime) -> Result<Self> {
        self.require_same_rate(&other, "subtract")?;
        let frames = self.frames.checked_sub(other.frames).ok_or_else(|| {
            TrimError::Overflow(format!("{} - {}", self, other))
        })?;
        Ok(RationalTime::new(frames, self.rate).ensure_non_negative())
    }

    /// Express this value at `target`, rounding the frame count half-to-even
    pub fn rescale_to(self, target: FrameRate) -> Result<Self> {
        if self.rate == target {
            return Ok(self);
        }

        let numerator = i128::from(self.frames)
            * i128::from(target.numerator)
            * i128::from(self.rate.denominator);
        let denominator = i128::from(target.denominator) * i128::from(self.rate.numerator);
        let frames = round_half_even(numerator, denominator);

        let frames = i64::try_from(frames).map_err(|_| {
            TrimError::Overflow(format!("rescaling {} to {} fps", self, target))
        })?;
        Ok(RationalTime::new(frames, target))
    }

    /// Clamp a negative frame count to zero
    pub fn ensure_non_negative(self) -> Self {
        if self.frames < 0 {
            debug!(
                frames = self.frames,
                rate = %self.rate,
                "Clamping negative time to zero"
            );
            RationalTime::zero(self.rate)
        } else {
            self
        }
    }

    /// Larger of two values at the same rate
    pub fn max(self, other: RationalTime) -> Result<Self> {
        self.require_same_rate(&other, "max")?;
        Ok(if other.frames > self.frames { other } else { self })
    }

    /// Smaller of two values at the same rate
    pub fn min(self, other: RationalTime) -> Result<Self> {
        self.require_same_rate(&other, "min")?;
        Ok(if other.frames < self.frames { other } else { self })
    }

    /// Compare two values after rescaling both to `rate`
    pub fn cmp_at(&self, other: &RationalTime, rate: FrameRate) -> Result<Ordering> {
        let left = self.rescale_to(rate)?;
        let right = other.rescale_to(rate)?;
        Ok(left.frames.cmp(&right.frames))
    }

    /// Compare the instants two values denote, exactly and without rounding
    pub fn cmp_instant(&self, other: &RationalTime) -> Ordering {
        // frames * den / num on both sides, cross-multiplied
        let left = i128::from(self.frames)
            * i128::from(self.rate.denominator)
            * i128::from(other.rate.numerator);
        let right = i128::from(other.frames)
            * i128::from(other.rate.denominator)
            * i128::from(self.rate.numerator);
        left.cmp(&right)
    }

    fn require_same_rate(&self, other: &RationalTime, op: &str) -> Result<()> {
        if self.rate != other.rate {
            return Err(TrimError::rate_mismatch(
                self.rate,
                other.rate,
                format!("{} of {} and {}", op, self, other),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frames, self.rate)
    }
}

/// Half-open `[start, end)` range at a single rate with `end >= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: RationalTime,
    end: RationalTime,
}

impl TimeRange {
    /// Create a validated range; `context` names the owner in error messages
    pub fn new(start: RationalTime, end: RationalTime, context: &str) -> Result<Self> {
        start.require_same_rate(&end, context)?;
        if end.frames < start.frames {
            return Err(TrimError::invalid_range(context, start, end));
        }
        Ok(TimeRange { start, end })
    }

    /// Inclusive start
    pub fn start(&self) -> RationalTime {
        self.start
    }

    /// Exclusive end
    pub fn end(&self) -> RationalTime {
        self.end
    }

    /// Rate shared by both bounds
    pub fn rate(&self) -> FrameRate {
        self.start.rate
    }

    /// `end - start`
    pub fn duration(&self) -> RationalTime {
        RationalTime::new(self.end.frames - self.start.frames, self.rate())
    }

    /// Rescale both bounds to `rate`
    pub fn rescale_to(&self, rate: FrameRate) -> Result<Self> {
        Ok(TimeRange {
            start: self.start.rescale_to(rate)?,
            end: self.end.rescale_to(rate)?,
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})@{}",
            self.start.frames, self.end.frames, self.start.rate
        )
    }
}

/// Divide `numerator` by a positive `denominator`, rounding half-to-even
pub fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);

    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient.rem_euclid(2) == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fps(n: u32) -> FrameRate {
        FrameRate::integer(n).unwrap()
    }

    #[test]
    fn test_frame_rate_reduces() {
        let rate = FrameRate::new(48, 2).unwrap();
        assert_eq!(rate, fps(24));
        assert!(FrameRate::new(0, 1).is_err());
        assert!(FrameRate::new(24, 0).is_err());
    }

    #[test]
    fn test_frame_rate_from_fps() {
        assert_eq!(FrameRate::from_fps(25.0).unwrap(), fps(25));
        assert_eq!(
            FrameRate::from_fps(23.976).unwrap(),
            FrameRate::new(24000, 1001).unwrap()
        );
        assert_eq!(
            FrameRate::from_fps(29.97).unwrap(),
            FrameRate::new(30000, 1001).unwrap()
        );
        assert_eq!(
            FrameRate::from_fps(12.5).unwrap(),
            FrameRate::new(25, 2).unwrap()
        );
        assert!(FrameRate::from_fps(0.0).is_err());
        assert!(FrameRate::from_fps(-24.0).is_err());
        assert!(FrameRate::from_fps(f64::NAN).is_err());
    }

    #[test]
    fn test_frame_rate_serde_as_fps() {
        let ntsc = FrameRate::new(24000, 1001).unwrap();
        let json = serde_json::to_string(&ntsc).unwrap();
        let back: FrameRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ntsc);
        assert_eq!(serde_json::to_string(&fps(24)).unwrap(), "24.0");
        assert_eq!(
            serde_json::to_string(&FrameRate::new(25, 2).unwrap()).unwrap(),
            "12.5"
        );
    }

    #[test]
    fn test_frame_rate_serde_keeps_inexact_fractions() {
        let third = FrameRate::new(50, 3).unwrap();
        let json = serde_json::to_string(&third).unwrap();
        assert_eq!(json, "\"50/3\"");
        let back: FrameRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, third);

        let from_int: FrameRate = serde_json::from_str("25").unwrap();
        assert_eq!(from_int, fps(25));
        assert!(serde_json::from_str::<FrameRate>("\"50/0\"").is_err());
        assert!(serde_json::from_str::<FrameRate>("\"fast\"").is_err());
    }

    #[test]
    fn test_frame_rate_from_str() {
        assert_eq!("50/3".parse::<FrameRate>().unwrap(), FrameRate::new(50, 3).unwrap());
        assert_eq!(" 48 / 2 ".parse::<FrameRate>().unwrap(), fps(24));
        assert_eq!(
            "29.97".parse::<FrameRate>().unwrap(),
            FrameRate::new(30000, 1001).unwrap()
        );
        assert!("1/x".parse::<FrameRate>().is_err());
        assert!("0".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(3, 2), 2); // 1.5
        assert_eq!(round_half_even(5, 2), 2); // 2.5
        assert_eq!(round_half_even(7, 2), 4); // 3.5
        assert_eq!(round_half_even(-5, 2), -2); // -2.5
        assert_eq!(round_half_even(-7, 2), -4); // -3.5
        assert_eq!(round_half_even(10, 4), 2); // 2.5
        assert_eq!(round_half_even(11, 4), 3); // 2.75
        assert_eq!(round_half_even(9, 4), 2); // 2.25
    }

    #[test]
    fn test_add_requires_same_rate() {
        let a = RationalTime::new(10, fps(24));
        let b = RationalTime::new(5, fps(24));
        assert_eq!(a.add(b).unwrap().frames(), 15);

        let c = RationalTime::new(5, fps(25));
        assert!(matches!(a.add(c), Err(TrimError::RateMismatch { .. })));
    }

    #[test]
    fn test_subtract_clamps_to_zero() {
        let a = RationalTime::new(10, fps(24));
        let b = RationalTime::new(12, fps(24));
        assert_eq!(a.subtract(b).unwrap(), RationalTime::zero(fps(24)));
        assert_eq!(b.subtract(a).unwrap().frames(), 2);
        assert!(a.subtract(RationalTime::new(1, fps(30))).is_err());
    }

    #[test]
    fn test_rescale_exact() {
        let t = RationalTime::new(10, fps(24));
        let t48 = t.rescale_to(fps(48)).unwrap();
        assert_eq!(t48.frames(), 20);
        assert_eq!(t48.rate(), fps(48));
        assert_eq!(t48.rescale_to(fps(24)).unwrap(), t);
    }

    #[test]
    fn test_rescale_rounds_half_even() {
        // 25 frames @48 = 12.5 frames @24 -> 12
        assert_eq!(
            RationalTime::new(25, fps(48)).rescale_to(fps(24)).unwrap().frames(),
            12
        );
        // 27 frames @48 = 13.5 frames @24 -> 14
        assert_eq!(
            RationalTime::new(27, fps(48)).rescale_to(fps(24)).unwrap().frames(),
            14
        );
        // 13 frames @25 = 12.48 frames @24 -> 12
        assert_eq!(
            RationalTime::new(13, fps(25)).rescale_to(fps(24)).unwrap().frames(),
            12
        );
    }

    #[test]
    fn test_rescale_ntsc() {
        let ntsc = FrameRate::new(24000, 1001).unwrap();
        // 1001 frames @23.976 = 1002.001 frames @24
        let t = RationalTime::new(1001, ntsc).rescale_to(fps(24)).unwrap();
        assert_eq!(t.frames(), 1002);
        let back = RationalTime::new(24, fps(24)).rescale_to(ntsc).unwrap();
        assert_eq!(back.frames(), 24);
    }

    #[test]
    fn test_seconds_conversion() {
        let half = RationalTime::from_seconds(0.5, fps(24)).unwrap();
        assert_eq!(half.frames(), 12);
        assert!((half.to_seconds() - 0.5).abs() < 1e-12);
        assert!(RationalTime::from_seconds(f64::INFINITY, fps(24)).is_err());
    }

    #[test]
    fn test_floor_seconds_never_exceeds_tolerance() {
        assert_eq!(RationalTime::floor_seconds(0.5, fps(24)).unwrap().frames(), 12);
        // 12.72 frames
        assert_eq!(RationalTime::floor_seconds(0.53, fps(24)).unwrap().frames(), 12);
        // 11.988 frames
        let ntsc = FrameRate::new(24000, 1001).unwrap();
        assert_eq!(RationalTime::floor_seconds(0.5, ntsc).unwrap().frames(), 11);
        // 28.999999999999996 in f64
        assert_eq!(RationalTime::floor_seconds(0.29, fps(100)).unwrap().frames(), 29);
        assert!(RationalTime::floor_seconds(f64::NAN, fps(24)).is_err());
    }

    #[test]
    fn test_cmp_instant_is_exact() {
        // 19@48 is 9.5 frames @24, strictly before 10@24
        let start = RationalTime::new(10, fps(24));
        let end = RationalTime::new(19, fps(48));
        assert_eq!(end.cmp_instant(&start), Ordering::Less);
        assert_eq!(end.cmp_at(&start, fps(24)).unwrap(), Ordering::Equal);

        let same = RationalTime::new(20, fps(48));
        assert_eq!(same.cmp_instant(&start), Ordering::Equal);
        let ntsc = FrameRate::new(24000, 1001).unwrap();
        assert_eq!(
            RationalTime::new(24, ntsc).cmp_instant(&RationalTime::new(24, fps(24))),
            Ordering::Greater
        );
    }

    #[test]
    fn test_ensure_non_negative() {
        let t = RationalTime::new(-3, fps(24));
        assert_eq!(t.ensure_non_negative().frames(), 0);
        let u = RationalTime::new(3, fps(24));
        assert_eq!(u.ensure_non_negative(), u);
    }

    #[test]
    fn test_cmp_at_mixed_rates() {
        let a = RationalTime::new(10, fps(24));
        let b = RationalTime::new(20, fps(48));
        assert_eq!(a.cmp_at(&b, fps(24)).unwrap(), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_time_range_validation() {
        let start = RationalTime::new(20, fps(24));
        let end = RationalTime::new(10, fps(24));
        assert!(matches!(
            TimeRange::new(start, end, "clip"),
            Err(TrimError::InvalidRange { .. })
        ));

        let range = TimeRange::new(end, start, "clip").unwrap();
        assert_eq!(range.duration().frames(), 10);
        assert_eq!(range.to_string(), "[10, 20)@24");
    }
}
