use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};

/// Time-of-day window during which autonomous sampling runs.
///
/// Pure function of wall-clock time; re-evaluated on every tick, never
/// cached. Both boundary minutes are inclusive.
#[derive(Clone, Copy, Debug)]
pub struct MarketWindow {
    open_minute: u32,
    close_minute: u32,
    weekdays_only: bool,
}

impl MarketWindow {
    pub fn new(open_h: u32, open_m: u32, close_h: u32, close_m: u32, weekdays_only: bool) -> Self {
        Self {
            open_minute: open_h * 60 + open_m,
            close_minute: close_h * 60 + close_m,
            weekdays_only,
        }
    }

    pub fn is_open(&self, at: DateTime<FixedOffset>) -> bool {
        if self.weekdays_only && matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let minute = at.hour() * 60 + at.minute();
        minute >= self.open_minute && minute <= self.close_minute
    }
}

impl Default for MarketWindow {
    /// Business-day schedule of the Buenos Aires caucion market.
    fn default() -> Self {
        Self::new(10, 30, 17, 0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(-3 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    #[test]
    fn boundary_minutes_are_inclusive() {
        let w = MarketWindow::default();
        // 2025-06-04 is a Wednesday.
        assert!(w.is_open(at(2025, 6, 4, 10, 30)));
        assert!(w.is_open(at(2025, 6, 4, 17, 0)));
        assert!(!w.is_open(at(2025, 6, 4, 10, 29)));
        assert!(!w.is_open(at(2025, 6, 4, 17, 1)));
    }

    #[test]
    fn weekends_are_closed_under_the_default_policy() {
        let w = MarketWindow::default();
        // 2025-06-07/08 are Saturday and Sunday.
        assert!(!w.is_open(at(2025, 6, 7, 12, 0)));
        assert!(!w.is_open(at(2025, 6, 8, 12, 0)));
        assert!(w.is_open(at(2025, 6, 6, 12, 0)));
    }

    #[test]
    fn every_day_policy_opens_on_weekends() {
        let w = MarketWindow::new(11, 0, 17, 30, false);
        assert!(w.is_open(at(2025, 6, 7, 11, 0)));
        assert!(w.is_open(at(2025, 6, 7, 17, 30)));
        assert!(!w.is_open(at(2025, 6, 7, 10, 59)));
    }
}
