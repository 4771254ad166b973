use std::fmt;

use super::TruncationDecision;
use crate::utils::bytes::ibytes;
use crate::TruncationConfig;

/// Log-safe rendering of a decision: numbers and the reason tag only, never
/// payloads or other cluster data. Keep it that way when adding fields.
pub struct DecisionDisplay<'a> {
    decision: &'a TruncationDecision,
    thresholds: &'a TruncationConfig,
}

impl TruncationDecision {
    pub fn display<'a>(
        &'a self,
        thresholds: &'a TruncationConfig,
    ) -> DecisionDisplay<'a> {
        DecisionDisplay {
            decision: self,
            thresholds,
        }
    }
}

impl fmt::Display for DecisionDisplay<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let d = self.decision;
        write!(f, "should truncate: {} [", d.should_truncate(self.thresholds))?;
        write!(
            f,
            "truncate {} entries to compacted index {} (chosen via: {})",
            d.num_truncatable_entries(),
            d.new_compacted_index,
            d.chosen_via
        )?;
        if d.input.log_too_large() {
            write!(
                f,
                "; log too large ({} > {})",
                ibytes(d.input.log_size_bytes),
                ibytes(d.input.max_log_size_bytes)
            )?;
        }
        let n = d.new_required_transfers();
        if n > 0 {
            write!(f, "; implies {} state transfer{}", n, if n == 1 { "" } else { "s" })?;
        }
        if !d.input.log_size_trusted {
            write!(f, "; log size untrusted")?;
        }
        write!(f, "]")
    }
}
