//! Pre-session countdown
//!
//! A fixed list of labels, each shown for a set time. Driven by frame ticks;
//! nothing here waits.

/// Labels and how long each stays up (ms)
pub const STEPS: [(&str, f64); 4] = [("3", 860.0), ("2", 860.0), ("1", 860.0), ("GO!", 520.0)];

/// Where the countdown is in `STEPS`
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    step: usize,
    /// Time left on the current label (ms)
    remaining_ms: f64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            step: 0,
            remaining_ms: STEPS[0].1,
        }
    }

    /// Label currently showing, `None` once finished
    pub fn label(&self) -> Option<&'static str> {
        STEPS.get(self.step).map(|(label, _)| *label)
    }

    pub fn is_finished(&self) -> bool {
        self.step >= STEPS.len()
    }

    /// Advance by `dt_ms`, pushing every label that comes up into `shown`
    ///
    /// Returns true once the last label has run out.
    pub fn advance(&mut self, dt_ms: f64, shown: &mut Vec<&'static str>) -> bool {
        let mut left = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        while !self.is_finished() && left >= self.remaining_ms {
            left -= self.remaining_ms;
            self.step += 1;
            match STEPS.get(self.step) {
                Some((label, duration)) => {
                    self.remaining_ms = *duration;
                    shown.push(*label);
                }
                None => self.remaining_ms = 0.0,
            }
        }
        if !self.is_finished() {
            self.remaining_ms -= left;
        }
        self.is_finished()
    }

    /// Total countdown length (ms)
    pub fn total_ms() -> f64 {
        STEPS.iter().map(|(_, ms)| ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_in_order() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.label(), Some("3"));
        let mut shown = Vec::new();

        assert!(!countdown.advance(859.0, &mut shown));
        assert!(shown.is_empty());
        assert!(!countdown.advance(1.0, &mut shown));
        assert_eq!(shown, vec!["2"]);
        assert!(!countdown.advance(1720.0, &mut shown));
        assert_eq!(shown, vec!["2", "1", "GO!"]);
        assert!(!countdown.advance(519.0, &mut shown));
        assert!(countdown.advance(1.0, &mut shown));
        assert_eq!(countdown.label(), None);
    }

    #[test]
    fn test_one_big_step_finishes() {
        let mut countdown = Countdown::new();
        let mut shown = Vec::new();
        assert!(countdown.advance(Countdown::total_ms() + 100.0, &mut shown));
        assert_eq!(shown, vec!["2", "1", "GO!"]);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut countdown = Countdown::new();
        let mut shown = Vec::new();
        assert!(!countdown.advance(f64::NAN, &mut shown));
        assert!(!countdown.advance(-500.0, &mut shown));
        assert_eq!(countdown.label(), Some("3"));
    }
}
