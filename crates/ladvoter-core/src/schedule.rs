//! Measurement time points.
//!
//! Measurements cost a full scan plus a labeling pass, so they are taken
//! only at scheduled times: every step within the current decade
//! (logarithmic spacing) or a fixed number of points spread as a power of
//! the time budget.

use serde::Deserialize;

/// Spacing of the measurement times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleKind {
    /// `0, 1, ..., 9, 10, 20, ..., 90, 100, 200, ...` up to the budget.
    #[default]
    Logarithmic,
    /// `points` times `t_k = round(T^(k / (points - 1)))`, made strictly
    /// increasing.
    PowerLaw {
        /// Number of time points before de-duplication.
        #[serde(default = "default_points")]
        points: usize,
    },
}

const fn default_points() -> usize {
    40
}

/// Strictly increasing list of measurement times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementSchedule {
    points: Vec<u64>,
}

impl MeasurementSchedule {
    /// Schedule of the given kind for a budget of `max_time` steps.
    pub fn new(kind: ScheduleKind, max_time: u64) -> Self {
        match kind {
            ScheduleKind::Logarithmic => Self::logarithmic(max_time),
            ScheduleKind::PowerLaw { points } => Self::power_law(max_time, points),
        }
    }

    /// One point per step within each decade, starting at `0`.
    pub fn logarithmic(max_time: u64) -> Self {
        let mut points = Vec::new();
        let mut t: u64 = 0;
        let mut step: u64 = 1;
        while t <= max_time {
            points.push(t);
            if t == step.saturating_mul(10) {
                step = t;
            }
            match t.checked_add(step) {
                Some(next) => t = next,
                None => break,
            }
        }
        Self { points }
    }

    /// `count` points spread as `round(max_time^(k / (count - 1)))`,
    /// starting at `1`. A point not above its predecessor is bumped to the
    /// predecessor plus one; points past `max_time` are dropped.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn power_law(max_time: u64, count: usize) -> Self {
        let mut points = Vec::with_capacity(count);
        if count < 2 {
            return Self { points };
        }
        let base = (max_time as f64).powf(1.0 / count.saturating_sub(1) as f64);
        let mut previous = 0_u64;
        for k in 0..count {
            let mut t = base.powf(k as f64).round() as u64;
            if t <= previous {
                t = previous.saturating_add(1);
            }
            if t > max_time {
                break;
            }
            points.push(t);
            previous = t;
        }
        Self { points }
    }

    /// The scheduled times.
    pub fn points(&self) -> &[u64] {
        &self.points
    }

    /// Number of scheduled times.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Scheduled time at `index`.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.points.get(index).copied()
    }
}
