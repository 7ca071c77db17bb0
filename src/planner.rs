//! Window planner.
//!
//! Divides an axis of length `N` into windows of size `S`. This is a pure
//! function of its inputs: the same axis and [`PlanSpec`] always give the same plan.
//!
//! ## Algorithm
//!
//! 1. `full = min(floor(N / S), M)` where `M` is the window cap (unbounded if unset)
//! 2. Under `middle` alignment with leftovers enabled, when `full` plus the
//!    leftovers it leaves would exceed `M` and `M >= 3`, reserve both edge
//!    slots: `full = min(floor(N / S), M - 2)`
//! 3. `remainder = N - full * S`, placed according to alignment:
//!    - `start`: all of it after the full windows
//!    - `end`: all of it before the full windows
//!    - `middle`: split in two, the leading half taking any odd unit
//! 4. Keep each non-empty leftover only if leftovers are enabled and the cap
//!    still has room after the full windows (leading leftover first)
//! 5. Number windows 1..n in timeline order
//!
//! When no full window fits, the whole axis becomes a single leftover (if
//! leftovers are enabled) regardless of alignment.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::types::{Measure, Window, WindowKind};

/// Where the packed full windows sit on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowAlignment {
    /// Pack from the start of the axis.
    Start,
    /// Center the packed windows.
    Middle,
    /// Pack back from the end of the axis.
    End,
}

impl WindowAlignment {
    /// Parse alignment from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "middle" => Some(Self::Middle),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

impl Default for WindowAlignment {
    fn default() -> Self {
        Self::Start
    }
}

impl fmt::Display for WindowAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Middle => write!(f, "middle"),
            Self::End => write!(f, "end"),
        }
    }
}

/// Planning parameters for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSpec<M> {
    /// Target window size.
    pub size: M,
    /// Placement of full windows.
    pub alignment: WindowAlignment,
    /// Cap on windows (full and leftover together).
    pub max_windows: Option<NonZeroUsize>,
    /// Whether partial edge windows are kept.
    pub leftovers: bool,
}

impl<M: Measure> PlanSpec<M> {
    /// Spec with start alignment, no cap and no leftovers.
    pub fn new(size: M) -> Self {
        Self {
            size,
            alignment: WindowAlignment::Start,
            max_windows: None,
            leftovers: false,
        }
    }

    /// Set the alignment.
    pub fn aligned(mut self, alignment: WindowAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the window cap.
    pub fn capped(mut self, max_windows: Option<NonZeroUsize>) -> Self {
        self.max_windows = max_windows;
        self
    }

    /// Enable or disable leftovers.
    pub fn with_leftovers(mut self, leftovers: bool) -> Self {
        self.leftovers = leftovers;
        self
    }
}

/// Plan windows over an axis of the given length.
///
/// Windows are returned in timeline order with ordinals starting at 1.
pub fn plan_windows<M: Measure>(length: M, spec: &PlanSpec<M>) -> Vec<Window<M>> {
    if length.is_empty() || spec.size.is_empty() {
        return Vec::new();
    }

    let budget = spec.max_windows.map(NonZeroUsize::get).unwrap_or(usize::MAX);
    let full = full_count(length, spec, budget);

    if full == 0 {
        if !spec.leftovers {
            return Vec::new();
        }
        return vec![Window {
            ordinal: 1,
            start: M::ZERO,
            end: length,
            kind: WindowKind::Leftover,
            size: length,
        }];
    }

    let (lead, trail) = edges(length, spec, full);

    let mut spare = budget - full;
    let keep_lead = spec.leftovers && !lead.is_empty() && spare > 0;
    if keep_lead {
        spare -= 1;
    }
    let keep_trail = spec.leftovers && !trail.is_empty() && spare > 0;

    let mut windows = Vec::with_capacity(full + 2);
    let mut push = |start: M, end: M, kind: WindowKind, size: M| {
        windows.push(Window {
            ordinal: windows.len() + 1,
            start,
            end,
            kind,
            size,
        });
    };

    if keep_lead {
        push(M::ZERO, lead, WindowKind::Leftover, lead);
    }
    for k in 0..full {
        let start = lead.plus(spec.size.times(k));
        let end = if k + 1 == full && trail.is_empty() {
            length
        } else {
            lead.plus(spec.size.times(k + 1))
        };
        push(start, end, WindowKind::Full, spec.size);
    }
    if keep_trail {
        let start = lead.plus(spec.size.times(full));
        push(start, length, WindowKind::Leftover, trail);
    }

    windows
}

/// Number of full windows, after reserving edge slots for centred leftovers.
fn full_count<M: Measure>(length: M, spec: &PlanSpec<M>, budget: usize) -> usize {
    let fit = length.fit(spec.size);
    let full = fit.min(budget);
    if spec.alignment != WindowAlignment::Middle || !spec.leftovers || budget < 3 || full == 0 {
        return full;
    }
    let (lead, trail) = edges(length, spec, full);
    let leftovers = usize::from(!lead.is_empty()) + usize::from(!trail.is_empty());
    if full + leftovers <= budget {
        full
    } else {
        fit.min(budget - 2)
    }
}

/// Leading and trailing remainder around `full` packed windows.
fn edges<M: Measure>(length: M, spec: &PlanSpec<M>, full: usize) -> (M, M) {
    let remainder = length.less(spec.size.times(full));
    match spec.alignment {
        WindowAlignment::Start => (M::ZERO, remainder),
        WindowAlignment::End => (remainder, M::ZERO),
        WindowAlignment::Middle => remainder.split(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(n)
    }

    fn spans<M: Measure>(windows: &[Window<M>]) -> Vec<(M, M)> {
        windows.iter().map(|w| (w.start, w.end)).collect()
    }

    #[test]
    fn test_start_packs_from_zero() {
        let spec = PlanSpec::new(5usize).with_leftovers(true);
        let windows = plan_windows(60, &spec);
        assert_eq!(windows.len(), 12);
        assert_eq!((windows[0].start, windows[0].end), (0, 5));
        assert_eq!((windows[11].start, windows[11].end), (55, 60));
        assert!(windows.iter().all(|w| w.is_full() && w.label() == "5"));
    }

    #[test]
    fn test_cap_with_nothing_left() {
        for leftovers in [false, true] {
            let spec = PlanSpec::new(10usize).capped(cap(3)).with_leftovers(leftovers);
            let windows = plan_windows(30, &spec);
            assert_eq!(spans(&windows), vec![(0, 10), (10, 20), (20, 30)]);
        }
    }

    #[test]
    fn test_alignments_under_cap() {
        let base = PlanSpec::new(10usize).capped(cap(3));
        let start = plan_windows(60, &base);
        assert_eq!(spans(&start), vec![(0, 10), (10, 20), (20, 30)]);
        let end = plan_windows(60, &base.aligned(WindowAlignment::End));
        assert_eq!(spans(&end), vec![(30, 40), (40, 50), (50, 60)]);
        let middle = plan_windows(60, &base.aligned(WindowAlignment::Middle));
        assert_eq!(spans(&middle), vec![(15, 25), (25, 35), (35, 45)]);
        let middle2 = plan_windows(60, &base.capped(cap(2)).aligned(WindowAlignment::Middle));
        assert_eq!(spans(&middle2), vec![(20, 30), (30, 40)]);
    }

    #[test]
    fn test_middle_leftovers_share_the_cap() {
        let spec = PlanSpec::new(25usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);

        let two = plan_windows(60, &spec.capped(cap(2)));
        assert_eq!(spans(&two), vec![(5, 30), (30, 55)]);

        let four = plan_windows(60, &spec.capped(cap(4)));
        assert_eq!(spans(&four), vec![(0, 5), (5, 30), (30, 55), (55, 60)]);
        let labels: Vec<_> = four.iter().map(|w| w.label()).collect();
        assert_eq!(labels, vec!["5", "25", "25", "5"]);
        let ordinals: Vec<_> = four.iter().map(|w| w.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);

        // an odd cap keeps both edges and centres a single full window
        let three = plan_windows(60, &spec.capped(cap(3)));
        assert_eq!(spans(&three), vec![(0, 18), (18, 43), (43, 60)]);
        let labels: Vec<_> = three.iter().map(|w| w.label()).collect();
        assert_eq!(labels, vec!["18", "25", "17"]);
        assert_eq!(three[1].kind, WindowKind::Full);
    }

    #[test]
    fn test_edge_reservation_only_when_needed() {
        let spec = PlanSpec::new(10usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);
        // exact fit: no leftovers to reserve for
        assert_eq!(spans(&plan_windows(30, &spec.capped(cap(3)))), vec![(0, 10), (10, 20), (20, 30)]);
        // both edges fit beside the full windows already
        let roomy = plan_windows(55, &spec.capped(cap(8)));
        assert_eq!(
            spans(&roomy),
            vec![(0, 3), (3, 13), (13, 23), (23, 33), (33, 43), (43, 53), (53, 55)]
        );
        // five full windows would fit, but the cap must cover both edges too
        let tight = plan_windows(60, &spec.capped(cap(5)));
        assert_eq!(spans(&tight), vec![(0, 15), (15, 25), (25, 35), (35, 45), (45, 60)]);
        assert_eq!(tight.iter().filter(|w| w.is_full()).count(), 3);
        // start alignment never trades full windows for leftovers
        let start = plan_windows(60, &PlanSpec::new(10usize).capped(cap(3)).with_leftovers(true));
        assert_eq!(spans(&start), vec![(0, 10), (10, 20), (20, 30)]);
    }

    #[test]
    fn test_middle_on_short_axis() {
        let spec = PlanSpec::new(10usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);
        let four = plan_windows(30, &spec.capped(cap(4)));
        assert_eq!(spans(&four), vec![(0, 10), (10, 20), (20, 30)]);
        let two = plan_windows(30, &spec.capped(cap(2)));
        assert_eq!(spans(&two), vec![(5, 15), (15, 25)]);
    }

    #[test]
    fn test_odd_remainder_favours_leading_leftover() {
        let spec = PlanSpec::new(10usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);
        let windows = plan_windows(25, &spec);
        assert_eq!(spans(&windows), vec![(0, 3), (3, 13), (13, 23), (23, 25)]);
        assert_eq!(windows[0].size, 3);
        assert_eq!(windows[3].size, 2);
    }

    #[test]
    fn test_end_alignment_leftover_first() {
        let spec = PlanSpec::new(10usize)
            .aligned(WindowAlignment::End)
            .with_leftovers(true);
        let windows = plan_windows(25, &spec);
        assert_eq!(spans(&windows), vec![(0, 5), (5, 15), (15, 25)]);
        assert_eq!(windows[0].kind, WindowKind::Leftover);
    }

    #[test]
    fn test_short_axis() {
        for alignment in [WindowAlignment::Start, WindowAlignment::Middle, WindowAlignment::End] {
            let spec = PlanSpec::new(10usize).aligned(alignment);
            assert!(plan_windows(7, &spec).is_empty());
            let windows = plan_windows(7, &spec.with_leftovers(true));
            assert_eq!(spans(&windows), vec![(0, 7)]);
            assert_eq!(windows[0].label(), "7");
        }
    }

    #[test]
    fn test_empty_axis() {
        let spec = PlanSpec::new(5usize).with_leftovers(true);
        assert!(plan_windows(0, &spec).is_empty());
        assert!(plan_windows(0.0, &PlanSpec::new(5.0).with_leftovers(true)).is_empty());
    }

    #[test]
    fn test_continuous_end_alignment() {
        let spec = PlanSpec::new(5.5f64)
            .aligned(WindowAlignment::End)
            .capped(cap(2));
        let windows = plan_windows(100.0, &spec);
        assert_eq!(spans(&windows), vec![(89.0, 94.5), (94.5, 100.0)]);
        assert!(windows.iter().all(|w| w.label() == "5.5"));
    }

    #[test]
    fn test_continuous_middle_leftovers() {
        let spec = PlanSpec::new(9.5f64)
            .aligned(WindowAlignment::Middle)
            .capped(cap(6))
            .with_leftovers(true);
        let windows = plan_windows(25.0, &spec);
        assert_eq!(
            spans(&windows),
            vec![(0.0, 3.0), (3.0, 12.5), (12.5, 22.0), (22.0, 25.0)]
        );
        let labels: Vec<_> = windows.iter().map(|w| w.label()).collect();
        assert_eq!(labels, vec!["3.000", "9.5", "9.5", "3.000"]);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let spec = PlanSpec::new(7usize)
            .aligned(WindowAlignment::Middle)
            .with_leftovers(true);
        assert_eq!(plan_windows(52, &spec), plan_windows(52, &spec));
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(WindowAlignment::from_str("Middle"), Some(WindowAlignment::Middle));
        assert_eq!(WindowAlignment::from_str("left"), None);
        assert_eq!(WindowAlignment::default(), WindowAlignment::Start);
    }
}
