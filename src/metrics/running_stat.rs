use serde::Serialize;

/// Running minimum, maximum and average of a stream of observations.
///
/// Constant size regardless of how many values were observed. An empty
/// accumulator reports no data rather than zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStat {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

/// Min/max/average of a populated [`RunningStat`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl Default for RunningStat {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }
}

impl RunningStat {
    /// Adds one observation. Non-finite values are ignored.
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `None` until the first observation.
    pub fn summary(&self) -> Option<StatSummary> {
        if self.count == 0 {
            return None;
        }
        // Accumulated rounding may push sum / count a hair outside the
        // observed range.
        let avg = (self.sum / self.count as f64).clamp(self.min, self.max);
        Some(StatSummary {
            min: self.min,
            max: self.max,
            avg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stat_has_no_summary() {
        let stat = RunningStat::default();
        assert!(stat.is_empty());
        assert_eq!(stat.summary(), None);
    }

    #[test]
    fn test_single_observation() {
        let mut stat = RunningStat::default();
        stat.observe(50.0);
        assert_eq!(
            stat.summary(),
            Some(StatSummary {
                min: 50.0,
                max: 50.0,
                avg: 50.0
            })
        );
    }

    #[test]
    fn test_min_max_avg() {
        let mut stat = RunningStat::default();
        for value in [3.0, 1.0, 8.0, 4.0] {
            stat.observe(value);
        }
        let summary = stat.summary().unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.avg, 4.0);
        assert_eq!(stat.count(), 4);
    }

    #[test]
    fn test_average_stays_within_bounds() {
        let mut stat = RunningStat::default();
        for _ in 0..1000 {
            stat.observe(0.1);
        }
        let summary = stat.summary().unwrap();
        assert!(summary.min <= summary.avg && summary.avg <= summary.max);

        let mut stat = RunningStat::default();
        for i in 0..500 {
            stat.observe((i as f64 * 7.3) % 13.0);
        }
        let summary = stat.summary().unwrap();
        assert!(summary.min <= summary.avg && summary.avg <= summary.max);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut stat = RunningStat::default();
        stat.observe(f64::NAN);
        stat.observe(f64::INFINITY);
        assert!(stat.is_empty());
        stat.observe(2.0);
        assert_eq!(stat.count(), 1);
    }
}
