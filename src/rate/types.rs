use chrono::Weekday;

/// One observation of the caucion rate, immutable once produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateSample {
    /// Annualized rate, in percent.
    pub value: f64,
    /// Unix-millisecond timestamp of the observation.
    pub observed_at_ms: u64,
}

/// Settlement term of the quoted caucion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateTerm {
    Overnight,
    ThreeDay,
}

impl RateTerm {
    /// Term code used by the quote board.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::Overnight => "T0",
            Self::ThreeDay => "T3",
        }
    }

    /// On Fridays the overnight placement spans the weekend, so the
    /// three-day term is the one actually traded.
    pub fn for_weekday(day: Weekday) -> Self {
        if day == Weekday::Fri {
            Self::ThreeDay
        } else {
            Self::Overnight
        }
    }
}

impl std::fmt::Display for RateTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overnight => write!(f, "overnight"),
            Self::ThreeDay => write!(f, "3-day"),
        }
    }
}
