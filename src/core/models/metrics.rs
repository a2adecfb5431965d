use std::collections::BTreeMap;
use std::fmt;

/// A ratio displayed as a whole percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentage {
    pub numerator: usize,
    pub denominator: usize,
}

impl Percentage {
    pub fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Rounded to the nearest whole percent; zero when the denominator is zero.
    pub fn percent(&self) -> usize {
        if self.denominator == 0 {
            return 0;
        }
        (self.numerator * 100 + self.denominator / 2) / self.denominator
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Figures shown on the project dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub requirement_total: usize,
    pub requirements_by_status: BTreeMap<String, usize>,
    /// Requirements with at least one linked test.
    pub test_coverage: Percentage,
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub tests_not_run: usize,
    /// Passed over executed (passed + failed).
    pub pass_rate: Percentage,
    pub risk_total: usize,
    pub open_risks: usize,
    pub open_high_exposure_risks: usize,
    pub cis_by_type: BTreeMap<String, usize>,
    pub asset_total: usize,
    pub asset_usage: u64,
    pub audit_by_actor: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_and_handles_zero() {
        assert_eq!(Percentage::new(1, 2).to_string(), "50%");
        assert_eq!(Percentage::new(1, 1).to_string(), "100%");
        assert_eq!(Percentage::new(2, 3).to_string(), "67%");
        assert_eq!(Percentage::new(1, 3).to_string(), "33%");
        assert_eq!(Percentage::new(0, 0).to_string(), "0%");
    }
}
