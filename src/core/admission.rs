use super::TruncationDecision;
use crate::TruncationConfig;

/// Whether, and how urgently, a group should be queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionVerdict {
    pub should_admit: bool,
    /// Processing must recompute the log size before trusting the decision
    pub needs_size_recompute: bool,
    /// Higher is processed first
    pub priority: f64,
}

impl AdmissionVerdict {
    const REJECT: AdmissionVerdict = AdmissionVerdict {
        should_admit: false,
        needs_size_recompute: false,
        priority: 0.0,
    };
}

/// Admission policy for one decision.
///
/// - A decision worth proposing is admitted with its log size as priority,
///   recomputing the size first if it is untrusted.
/// - A non-empty log with an untrusted size is admitted anyway so the size
///   gets recomputed, at `1 + max_log_size / 2`: halfway between zero and the
///   limit, so corrections happen promptly without starving busy groups that
///   are legitimately large.
/// - Anything else is not admitted.
///
/// The recompute path applies to followers as well; only the leader ever
/// produces a decision though.
pub fn evaluate_admission(
    decision: &TruncationDecision,
    thresholds: &TruncationConfig,
) -> AdmissionVerdict {
    let input = &decision.input;

    if decision.should_truncate(thresholds) {
        return AdmissionVerdict {
            should_admit: true,
            needs_size_recompute: !input.log_size_trusted,
            priority: input.log_size_bytes as f64,
        };
    }

    if input.log_size_trusted || input.log_empty() {
        return AdmissionVerdict::REJECT;
    }

    AdmissionVerdict {
        should_admit: true,
        needs_size_recompute: true,
        priority: 1.0 + input.max_log_size_bytes as f64 / 2.0,
    }
}

/// Admission for an optional decision: no decision, no admission.
pub fn evaluate_admission_opt(
    decision: Option<&TruncationDecision>,
    thresholds: &TruncationConfig,
) -> AdmissionVerdict {
    match decision {
        Some(d) => evaluate_admission(d, thresholds),
        None => AdmissionVerdict::REJECT,
    }
}
