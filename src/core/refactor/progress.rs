use serde::Serialize;

/// Weight of the per-node walk in the overall progress bar.
const WALK_WEIGHT: f64 = 0.7;
/// Progress already reported when the walk starts (start + backup).
const WALK_OFFSET: f64 = 0.3;

/// One progress update pushed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub message: String,
    /// Not clamped: a walk that visits excluded nodes can report more than 1.0.
    pub fraction: f64,
    pub is_error: bool,
}

impl ProgressRecord {
    pub fn new(message: impl Into<String>, fraction: f64, is_error: bool) -> Self {
        Self {
            message: message.into(),
            fraction,
            is_error,
        }
    }

    pub fn info(message: impl Into<String>, fraction: f64) -> Self {
        Self::new(message, fraction, false)
    }

    pub fn error(message: impl Into<String>, fraction: f64) -> Self {
        Self::new(message, fraction, true)
    }
}

/// Receives progress records synchronously, in emission order.
pub trait ProgressSink {
    fn report(&mut self, record: ProgressRecord);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressRecord),
{
    fn report(&mut self, record: ProgressRecord) {
        self(record)
    }
}

/// Per-walk counter turning visited nodes into a progress fraction.
///
/// `total` counts included nodes only, while every visited node advances
/// `current`; skipped nodes push the fraction past 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    current: usize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Fraction for the node being visited now, then advance.
    pub fn advance(&mut self) -> f64 {
        let fraction = (self.current as f64 / self.total.max(1) as f64) * WALK_WEIGHT + WALK_OFFSET;
        self.current += 1;
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn counter_starts_at_walk_offset() {
        let mut counter = ProgressCounter::new(4);
        assert!(close(counter.advance(), 0.3));
        assert!(close(counter.advance(), 0.475));
        assert!(close(counter.advance(), 0.65));
    }

    #[test]
    fn counter_overshoots_when_visits_exceed_total() {
        let mut counter = ProgressCounter::new(2);
        let fractions: Vec<f64> = (0..5).map(|_| counter.advance()).collect();
        assert!(close(fractions[2], 1.0));
        assert!(fractions[4] > 1.0);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |r: ProgressRecord| seen.push(r);
            sink.report(ProgressRecord::info("one", 0.0));
            sink.report(ProgressRecord::error("two", 1.0));
        }
        assert_eq!(seen.len(), 2);
        assert!(seen[1].is_error);
    }
}
