/// Consecutive-hit tracking. The combo resets on any mismatch or timeout;
/// the max combo is a running high-water mark that never resets within a
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboTracker {
    combo: u32,
    max_combo: u32,
}

impl ComboTracker {
    /// Records one correct character and returns the new combo.
    pub fn record_hit(&mut self) -> u32 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.combo
    }

    pub fn reset(&mut self) {
        self.combo = 0;
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// True on every positive multiple of ten. The attack handler announces
    /// the streak exactly when this fires.
    pub fn at_streak_milestone(&self) -> bool {
        self.combo > 0 && self.combo % 10 == 0
    }

    /// The persistent HUD label, recomputed on every refresh from
    /// `combo >= 10`. Intentionally independent of the milestone rule above;
    /// both conditions are part of the observable behavior.
    pub fn streak_label(&self) -> Option<String> {
        (self.combo >= 10).then(|| format!("Combo! x{}", self.combo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_increment_combo_and_track_max() {
        let mut tracker = ComboTracker::default();

        assert_eq!(tracker.record_hit(), 1);
        assert_eq!(tracker.record_hit(), 2);
        assert_eq!(tracker.combo(), 2);
        assert_eq!(tracker.max_combo(), 2);
    }

    #[test]
    fn reset_clears_combo_but_not_max() {
        let mut tracker = ComboTracker::default();
        for _ in 0..5 {
            tracker.record_hit();
        }

        tracker.reset();

        assert_eq!(tracker.combo(), 0);
        assert_eq!(tracker.max_combo(), 5);
    }

    #[test]
    fn max_only_advances_on_new_high() {
        let mut tracker = ComboTracker::default();
        for _ in 0..7 {
            tracker.record_hit();
        }
        tracker.reset();
        for _ in 0..3 {
            tracker.record_hit();
        }

        assert_eq!(tracker.combo(), 3);
        assert_eq!(tracker.max_combo(), 7);
    }

    #[test]
    fn milestone_fires_only_on_multiples_of_ten() {
        let mut tracker = ComboTracker::default();

        for expected in 1..=30u32 {
            tracker.record_hit();
            assert_eq!(tracker.at_streak_milestone(), expected % 10 == 0);
        }
    }

    #[test]
    fn milestone_is_quiet_at_zero() {
        let tracker = ComboTracker::default();
        assert!(!tracker.at_streak_milestone());
    }

    #[test]
    fn label_appears_from_ten_onwards() {
        let mut tracker = ComboTracker::default();

        for _ in 0..9 {
            tracker.record_hit();
        }
        assert_eq!(tracker.streak_label(), None);

        tracker.record_hit();
        assert_eq!(tracker.streak_label(), Some("Combo! x10".to_string()));

        // the persistent label keeps tracking past the milestone
        tracker.record_hit();
        assert_eq!(tracker.streak_label(), Some("Combo! x11".to_string()));
    }
}
