//! Window types and the measure abstraction shared by discrete and
//! continuous axes.
//!
//! ## Measures
//!
//! | axis | measure | unit |
//! |------|---------|------|
//! | discrete | `usize` | one counting-layer annotation |
//! | continuous | `f64` | one unit of offset (usually seconds) |
//!
//! The planner is written once against [`Measure`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for comparing continuous offsets.
pub const OFFSET_EPSILON: f64 = 1e-9;

/// Whether a window has exactly the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Exactly the target size.
    Full,
    /// A partial window at an edge of the axis.
    Leftover,
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Leftover => write!(f, "leftover"),
        }
    }
}

/// A quantity that windows can be measured in.
pub trait Measure: Copy + PartialOrd + fmt::Debug {
    /// The empty quantity.
    const ZERO: Self;

    /// How many whole `size`s fit in `self`.
    fn fit(self, size: Self) -> usize;

    /// `self * n`.
    fn times(self, n: usize) -> Self;

    /// `self + other`.
    fn plus(self, other: Self) -> Self;

    /// `self - other`, never below zero.
    fn less(self, other: Self) -> Self;

    /// Split into (leading, trailing) halves; any indivisible excess goes
    /// to the leading half.
    fn split(self) -> (Self, Self);

    /// Whether the quantity is (effectively) zero.
    fn is_empty(self) -> bool;

    /// Literal label for a window of this size.
    fn format_label(self, kind: WindowKind) -> String;
}

impl Measure for usize {
    const ZERO: Self = 0;

    fn fit(self, size: Self) -> usize {
        if size == 0 {
            0
        } else {
            self / size
        }
    }

    fn times(self, n: usize) -> Self {
        self.saturating_mul(n)
    }

    fn plus(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    fn less(self, other: Self) -> Self {
        self.saturating_sub(other)
    }

    fn split(self) -> (Self, Self) {
        let lead = self - self / 2;
        (lead, self / 2)
    }

    fn is_empty(self) -> bool {
        self == 0
    }

    fn format_label(self, _kind: WindowKind) -> String {
        self.to_string()
    }
}

impl Measure for f64 {
    const ZERO: Self = 0.0;

    fn fit(self, size: Self) -> usize {
        if !size.is_finite() || size <= 0.0 || self.is_nan() || self <= 0.0 {
            return 0;
        }
        ((self + OFFSET_EPSILON) / size).floor() as usize
    }

    fn times(self, n: usize) -> Self {
        self * n as f64
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn less(self, other: Self) -> Self {
        let rest = self - other;
        if rest <= OFFSET_EPSILON {
            0.0
        } else {
            rest
        }
    }

    fn split(self) -> (Self, Self) {
        (self / 2.0, self / 2.0)
    }

    fn is_empty(self) -> bool {
        self <= OFFSET_EPSILON
    }

    fn format_label(self, kind: WindowKind) -> String {
        match kind {
            WindowKind::Full => format!("{}", self),
            WindowKind::Leftover => format!("{:.3}", self),
        }
    }
}

/// A planned window over an axis, in axis-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window<M> {
    /// Position within the scope's sequence (1-based, timeline order).
    pub ordinal: usize,
    /// Axis-relative start.
    pub start: M,
    /// Axis-relative end (exclusive).
    pub end: M,
    /// Full or leftover.
    pub kind: WindowKind,
    /// Literal size of the window.
    pub size: M,
}

impl<M: Measure> Window<M> {
    /// Whether this window has exactly the target size.
    pub fn is_full(&self) -> bool {
        self.kind == WindowKind::Full
    }

    /// Literal label for the window.
    pub fn label(&self) -> String {
        self.size.format_label(self.kind)
    }
}
