//! Memory estimate result and its presentation view.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One of the four parts of a memory estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryComponent {
    Weights,
    KvCache,
    ComputeBuffer,
    OutputBuffer,
}

impl MemoryComponent {
    /// All components in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Weights,
        Self::KvCache,
        Self::ComputeBuffer,
        Self::OutputBuffer,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weights => "Weights",
            Self::KvCache => "KV Cache",
            Self::ComputeBuffer => "Compute Buffer",
            Self::OutputBuffer => "Output Buffer",
        }
    }
}

/// Estimated peak memory for one model/runtime configuration, in bytes.
///
/// Serializes with an extra `total` field; deserialization ignores it and
/// recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct MemoryEstimate {
    pub weights: u64,
    pub kv_cache: u64,
    pub compute_buffer: u64,
    pub output_buffer: u64,
}

impl MemoryEstimate {
    /// Sum of all four components, saturating at `u64::MAX`.
    pub const fn total(&self) -> u64 {
        self.weights
            .saturating_add(self.kv_cache)
            .saturating_add(self.compute_buffer)
            .saturating_add(self.output_buffer)
    }

    /// Bytes for a single component.
    pub const fn component(&self, component: MemoryComponent) -> u64 {
        match component {
            MemoryComponent::Weights => self.weights,
            MemoryComponent::KvCache => self.kv_cache,
            MemoryComponent::ComputeBuffer => self.compute_buffer,
            MemoryComponent::OutputBuffer => self.output_buffer,
        }
    }

    /// Percentage of the total taken by a component (0.0 for an empty estimate).
    #[allow(clippy::cast_precision_loss)]
    pub fn share_of_total(&self, component: MemoryComponent) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.component(component) as f64 / total as f64 * 100.0
    }

    /// Whether the estimate fits in `available_bytes`.
    pub const fn fits_within(&self, available_bytes: u64) -> bool {
        self.total() <= available_bytes
    }

    /// Multi-line human-readable breakdown.
    pub fn summary(&self) -> String {
        let mut out = String::from("Memory Estimate:\n");
        for component in MemoryComponent::ALL {
            let label = format!("{}:", component.label());
            out.push_str(&format!(
                "  {label:<16}{:>10} ({:.1}%)\n",
                format_bytes(self.component(component)),
                self.share_of_total(component)
            ));
        }
        out.push_str("  ─────────────────────────────\n");
        out.push_str(&format!("  {:<16}{:>10}", "Total:", format_bytes(self.total())));
        out
    }
}

impl fmt::Display for MemoryEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl Serialize for MemoryEstimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MemoryEstimate", 5)?;
        state.serialize_field("weights", &self.weights)?;
        state.serialize_field("kv_cache", &self.kv_cache)?;
        state.serialize_field("compute_buffer", &self.compute_buffer)?;
        state.serialize_field("output_buffer", &self.output_buffer)?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

/// Format a byte count with decimal units.
///
/// GB with two decimals from 1e9, MB with one decimal from 1e6, KB with one
/// decimal below that.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    let value = bytes as f64;
    if value >= 1e9 {
        format!("{:.2} GB", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1} MB", value / 1e6)
    } else {
        format!("{:.1} KB", value / 1e3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryEstimate {
        MemoryEstimate {
            weights: 1_321_079_200,
            kv_cache: 67_108_864,
            compute_buffer: 266_862_592,
            output_buffer: 513_024,
        }
    }

    #[test]
    fn test_total_is_sum() {
        let est = sample();
        assert_eq!(est.total(), 1_321_079_200 + 67_108_864 + 266_862_592 + 513_024);
    }

    #[test]
    fn test_total_saturates() {
        let est = MemoryEstimate {
            kv_cache: u64::MAX,
            ..sample()
        };
        assert_eq!(est.total(), u64::MAX);
        assert!(est.fits_within(u64::MAX));
        assert!(est.summary().contains("Total:"));
        assert_eq!(serde_json::to_value(est).unwrap()["total"], u64::MAX);
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(1_321_079_200), "1.32 GB");
        assert_eq!(format_bytes(1_000_000_000), "1.00 GB");
        assert_eq!(format_bytes(67_108_864), "67.1 MB");
        assert_eq!(format_bytes(999_999), "1000.0 KB");
        assert_eq!(format_bytes(513_024), "513.0 KB");
        assert_eq!(format_bytes(0), "0.0 KB");
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let est = sample();
        let sum: f64 = MemoryComponent::ALL
            .iter()
            .map(|c| est.share_of_total(*c))
            .sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_share_of_empty_estimate() {
        let est = MemoryEstimate {
            weights: 0,
            kv_cache: 0,
            compute_buffer: 0,
            output_buffer: 0,
        };
        assert!(est.share_of_total(MemoryComponent::KvCache).abs() < f64::EPSILON);
        assert!(est.summary().contains("(0.0%)"));
    }

    #[test]
    fn test_summary_layout() {
        let summary = sample().summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Memory Estimate:");
        assert_eq!(lines[1], "  Weights:           1.32 GB (79.8%)");
        assert_eq!(lines[2], "  KV Cache:          67.1 MB (4.1%)");
        assert_eq!(lines[3], "  Compute Buffer:   266.9 MB (16.1%)");
        assert_eq!(lines[4], "  Output Buffer:    513.0 KB (0.0%)");
        assert_eq!(lines[6], "  Total:             1.66 GB");
    }

    #[test]
    fn test_fits_within() {
        let est = sample();
        assert!(est.fits_within(est.total()));
        assert!(!est.fits_within(est.total() - 1));
    }

    #[test]
    fn test_serialize_includes_total() {
        let est = sample();
        let json = serde_json::to_value(est).unwrap();
        assert_eq!(json["total"], est.total());
        assert_eq!(json["kv_cache"], 67_108_864);

        let back: MemoryEstimate = serde_json::from_value(json).unwrap();
        assert_eq!(back, est);
    }
}
