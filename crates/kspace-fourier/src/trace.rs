use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use kspace_runtime::{EvidenceLedger, RuntimeMode};
use serde::Serialize;

use crate::TransformKind;

/// Number of traces retained before the oldest are evicted.
pub const TRACE_CAPACITY: usize = 1024;

/// Audit record of one completed top-level transform call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformTrace {
    pub operation_id: String,
    pub kind: TransformKind,
    pub direction: &'static str,
    /// Shape of the array handed back to the caller.
    pub shape: Vec<usize>,
    /// Single-instance primitive invocations made for this call.
    pub batch_items: usize,
    pub backend: &'static str,
    /// Validation mode of the call; uniform transforms have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RuntimeMode>,
    pub timing_ns: u128,
}

impl TransformTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Process-wide ledger. Transforms hold the lock only to push one finished
/// record; a panic while it was held leaves the ledger intact, so a poisoned
/// lock is recovered instead of dropping traces.
static TRACE_LOG: OnceLock<Mutex<EvidenceLedger<TransformTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<EvidenceLedger<TransformTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(EvidenceLedger::new(TRACE_CAPACITY)))
}

pub(crate) fn next_operation_id() -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("fourier-op-{next:016x}")
}

pub(crate) fn record_trace(trace: TransformTrace) {
    trace_log()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .record(trace);
}

/// Held by unit tests that drain the ledger, so parallel tests keep their records.
#[cfg(test)]
pub(crate) static DRAIN_GUARD: Mutex<()> = Mutex::new(());

/// Drain every retained trace, oldest first.
#[must_use]
pub fn take_transform_traces() -> Vec<TransformTrace> {
    trace_log()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain()
}

#[cfg(test)]
mod tests {
    use std::sync::PoisonError;

    use kspace_runtime::RuntimeMode;

    use super::{TransformTrace, next_operation_id, record_trace, take_transform_traces, trace_log};
    use crate::TransformKind;

    #[test]
    fn operation_ids_are_unique_and_ordered() {
        let first = next_operation_id();
        let second = next_operation_id();
        assert!(first.starts_with("fourier-op-"));
        assert!(first < second);
    }

    #[test]
    fn json_line_uses_snake_case_kind() {
        let trace = TransformTrace {
            operation_id: next_operation_id(),
            kind: TransformKind::NufftAdjoint,
            direction: "adjoint",
            shape: vec![2, 16, 1, 1],
            batch_items: 2,
            backend: "direct_nudft",
            mode: Some(RuntimeMode::Strict),
            timing_ns: 10,
        };
        let value: serde_json::Value =
            serde_json::from_str(&trace.to_json_line()).expect("trace is valid json");
        assert_eq!(value["kind"], "nufft_adjoint");
        assert_eq!(value["shape"], serde_json::json!([2, 16, 1, 1]));
        assert_eq!(value["batch_items"], 2);
        assert_eq!(value["mode"], "Strict");
    }

    #[test]
    fn uniform_trace_omits_mode() {
        let trace = TransformTrace {
            operation_id: next_operation_id(),
            kind: TransformKind::Fftn,
            direction: "forward",
            shape: vec![8],
            batch_items: 1,
            backend: "rustfft",
            mode: None,
            timing_ns: 1,
        };
        let value: serde_json::Value =
            serde_json::from_str(&trace.to_json_line()).expect("trace is valid json");
        assert!(value.get("mode").is_none());
    }

    #[test]
    fn poisoned_ledger_still_records_and_drains() {
        let _drain = super::DRAIN_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = std::thread::spawn(|| {
            let _guard = trace_log().lock();
            panic!("poison the trace ledger");
        })
        .join();
        assert!(trace_log().is_poisoned());

        let operation_id = next_operation_id();
        record_trace(TransformTrace {
            operation_id: operation_id.clone(),
            kind: TransformKind::Ifftn,
            direction: "inverse",
            shape: vec![3, 3],
            batch_items: 1,
            backend: "rustfft",
            mode: None,
            timing_ns: 1,
        });
        assert!(
            take_transform_traces()
                .iter()
                .any(|trace| trace.operation_id == operation_id)
        );
    }
}
