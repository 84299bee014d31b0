use serde::{Deserialize, Serialize};

/// Closed numeric interval along one sampling axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    /// The `(0, 0)` range, which update calls read as "keep the current range".
    pub const KEEP: ParamRange = ParamRange { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_keep(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    /// `self`, unless it is [`ParamRange::KEEP`], in which case `current`.
    pub fn or_keep(self, current: ParamRange) -> ParamRange {
        if self.is_keep() {
            current
        } else {
            self
        }
    }

    /// Finite bounds with `min < max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Place `count` samples on this range.
    ///
    /// With borders included the first and last samples sit on the bounds.
    /// Otherwise the range is split into `count + 1` steps and only the
    /// interior points are used.
    pub fn sampling(&self, count: usize, include_borders: bool) -> AxisSampling {
        if include_borders {
            let step = self.span() / (count.max(2) - 1) as f64;
            AxisSampling {
                start: self.min,
                step,
                count,
            }
        } else {
            let step = self.span() / (count + 1) as f64;
            AxisSampling {
                start: self.min + step,
                step,
                count,
            }
        }
    }
}

impl Default for ParamRange {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

/// Regularly spaced samples produced by [`ParamRange::sampling`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSampling {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl AxisSampling {
    pub fn at(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.at(i))
    }
}
