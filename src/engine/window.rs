use chrono::NaiveTime;

/// Daily time-of-day interval during which submissions are accepted.
///
/// `end` earlier than `start` means the window wraps past midnight
/// (e.g. 22:00–02:00 for a night shift). `start == end` is a closed
/// window; settings validation rejects that case before a window is
/// ever constructed, so `contains` only has to stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the given local time of day falls inside the window.
    /// Both ends are inclusive. Must be re-evaluated against a fresh
    /// "now" on every submission; never cache the verdict across calls.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start == self.end {
            // Zero-width window: closed all day.
            false
        } else if self.start < self.end {
            self.start <= t && t <= self.end
        } else {
            // Wraps past midnight: inside the evening leg or the
            // early-morning leg of the next day.
            t >= self.start || t <= self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn plain_window_includes_both_ends() {
        let w = TimeWindow::new(t(7, 0, 0), t(16, 0, 0));
        assert!(w.contains(t(7, 0, 0)));
        assert!(w.contains(t(9, 0, 0)));
        assert!(w.contains(t(16, 0, 0)));
    }

    #[test]
    fn plain_window_excludes_one_second_past_end() {
        let w = TimeWindow::new(t(7, 0, 0), t(16, 0, 0));
        assert!(!w.contains(t(16, 0, 1)));
        assert!(!w.contains(t(6, 59, 59)));
    }

    #[test]
    fn wrapped_window_covers_late_evening() {
        let w = TimeWindow::new(t(22, 0, 0), t(2, 0, 0));
        assert!(w.contains(t(23, 30, 0)));
        assert!(w.contains(t(22, 0, 0)));
    }

    #[test]
    fn wrapped_window_covers_early_morning_of_next_day() {
        let w = TimeWindow::new(t(22, 0, 0), t(2, 0, 0));
        assert!(w.contains(t(1, 0, 0)));
        assert!(w.contains(t(2, 0, 0)));
    }

    #[test]
    fn wrapped_window_excludes_the_daytime_gap() {
        let w = TimeWindow::new(t(22, 0, 0), t(2, 0, 0));
        assert!(!w.contains(t(3, 0, 0)));
        assert!(!w.contains(t(12, 0, 0)));
        assert!(!w.contains(t(21, 59, 59)));
        assert!(!w.contains(t(2, 0, 1)));
    }

    #[test]
    fn zero_width_window_is_closed() {
        let w = TimeWindow::new(t(8, 0, 0), t(8, 0, 0));
        assert!(!w.contains(t(8, 0, 0)));
        assert!(!w.contains(t(12, 0, 0)));
    }
}
