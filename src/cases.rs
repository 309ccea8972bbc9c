//! Sampling protocols of the Green Edge 2016 ice camp.
//!
//! Each case is a set of sampling depths seen on one or more days, with the
//! trapezoidal weights (m) that turn the discrete profile into a 0-100 m
//! integral. Depths are elevations (negative down), sorted from the surface.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingCase {
    pub label: &'static str,
    pub depths: &'static [f64],
    pub weights: &'static [f64],
    /// Whether days may be matched to this case.
    pub matchable: bool,
}

impl SamplingCase {
    /// Whether `depths` (elevations, sorted descending, no duplicates) is
    /// exactly this case's depth set.
    pub fn matches(&self, depths: &[f64]) -> bool {
        self.matchable && self.depths == depths
    }

    /// Water-column extent covered by the weights (m).
    pub fn extent(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.depths.iter().copied().zip(self.weights.iter().copied())
    }
}

pub static SAMPLING_CASES: [SamplingCase; 9] = [
    // doy 120; too shallow to extrapolate down to 100 m
    SamplingCase {
        label: "case1",
        depths: &[-1.5, -5.0],
        weights: &[3.25, 96.75],
        matchable: false,
    },
    // doy 123
    SamplingCase {
        label: "case2",
        depths: &[-1.5, -5.0, -10.0, -20.0, -40.0],
        weights: &[3.25, 4.25, 7.5, 15.0, 70.0],
        matchable: true,
    },
    // doy 125
    SamplingCase {
        label: "case3",
        depths: &[0.0, -5.0, -10.0, -20.0],
        weights: &[2.5, 5.0, 7.5, 85.0],
        matchable: true,
    },
    // doy 127 to 176, most of the campaign
    SamplingCase {
        label: "case4",
        depths: &[0.0, -1.5, -5.0, -10.0, -20.0, -40.0],
        weights: &[0.75, 2.5, 4.25, 7.5, 15.0, 70.0],
        matchable: true,
    },
    // doy 132
    SamplingCase {
        label: "case5",
        depths: &[0.0, -1.5, -5.0, -10.0, -40.0],
        weights: &[0.75, 2.5, 4.25, 17.5, 75.0],
        matchable: true,
    },
    // doy 137, 139
    SamplingCase {
        label: "case6",
        depths: &[0.0, -1.5, -5.0, -10.0, -20.0],
        weights: &[0.75, 2.5, 4.25, 7.5, 85.0],
        matchable: true,
    },
    // doy 179 to 190
    SamplingCase {
        label: "case7",
        depths: &[0.0, -1.5, -10.0, -20.0, -30.0, -60.0],
        weights: &[0.75, 5.0, 9.25, 10.0, 20.0, 55.0],
        matchable: true,
    },
    // doy 193, 195, 200
    SamplingCase {
        label: "case8",
        depths: &[-1.5, -10.0, -20.0, -30.0, -60.0, -75.0],
        weights: &[5.75, 9.25, 10.0, 20.0, 22.5, 32.5],
        matchable: true,
    },
    // doy 182, 197
    SamplingCase {
        label: "case9",
        depths: &[-1.5, -10.0, -20.0, -30.0, -45.0, -60.0],
        weights: &[5.75, 9.25, 10.0, 12.5, 15.0, 47.5],
        matchable: true,
    },
];

/// First matchable case whose depth set is exactly `depths`.
pub fn classify<'a>(catalog: &'a [SamplingCase], depths: &[f64]) -> Option<&'a SamplingCase> {
    catalog.iter().find(|case| case.matches(depths))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_consistent() {
        for case in &SAMPLING_CASES {
            assert_eq!(case.depths.len(), case.weights.len(), "{}", case.label);
            assert!(
                case.depths.windows(2).all(|w| w[0] > w[1]),
                "{} depths are not sorted from the surface",
                case.label
            );
            assert!((case.extent() - 100.0).abs() < 1e-9, "{}", case.label);
        }
    }

    #[test]
    fn test_classify() {
        let case = classify(&SAMPLING_CASES, &[0.0, -1.5, -5.0, -10.0, -20.0, -40.0]).unwrap();
        assert_eq!(case.label, "case4");

        assert!(classify(&SAMPLING_CASES, &[0.0, -1.5, -5.0, -10.0]).is_none());
    }

    #[test]
    fn test_shallow_case_is_never_matched() {
        assert!(classify(&SAMPLING_CASES, &[-1.5, -5.0]).is_none());
    }
}
