/// Numeric thresholds used when judging generated geometry.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Below this length a vector is treated as zero (degenerate normal).
    pub degenerate_length: f64,
    /// Allowed deviation of a normalized vector's length from 1.
    pub unit_length: f64,
}

impl Tolerance {
    pub const DEFAULT_DEGENERATE: f64 = 1e-12;
    pub const DEFAULT_UNIT: f64 = 1e-4;

    pub fn new(degenerate_length: f64, unit_length: f64) -> Self {
        Self {
            degenerate_length,
            unit_length,
        }
    }

    /// Check if a length is small enough to count as a zero vector
    pub fn is_degenerate(self, length: f64) -> bool {
        !(length > self.degenerate_length)
    }

    /// Check if a length is one within the unit tolerance
    pub fn is_unit(self, length: f64) -> bool {
        (length - 1.0).abs() < self.unit_length
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEGENERATE, Self::DEFAULT_UNIT)
    }
}
