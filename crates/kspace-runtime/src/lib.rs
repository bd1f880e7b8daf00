#![forbid(unsafe_code)]

//! kspace runtime: execution mode, bounded audit ledger, and the shared
//! structured-logging and tolerance helpers used by the transform tests.
//!
//! ## Module layout
//!
//! | Module   | Contents                                      |
//! |----------|-----------------------------------------------|
//! | `mode`   | [`RuntimeMode`] enum (Strict / Hardened)      |
//! | `ledger` | [`EvidenceLedger`] bounded FIFO audit buffer  |

pub mod ledger;
pub mod mode;

pub use ledger::EvidenceLedger;
pub use mode::RuntimeMode;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, saturating to zero on clock skew.
#[must_use]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: shared assertion and logging utilities
// ═══════════════════════════════════════════════════════════════════

/// One JSON line per test case, so runs can be diffed by `test_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogEntry {
    pub test_id: String,
    pub timestamp_ms: u64,
    pub module: String,
    pub message: String,
    /// Input shapes or trajectory the case ran on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RuntimeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
}

impl TestResult {
    #[must_use]
    pub fn from_pass(pass: bool) -> Self {
        if pass { Self::Pass } else { Self::Fail }
    }
}

impl TestLogEntry {
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            timestamp_ms: now_unix_ms(),
            module: module.into(),
            message: message.into(),
            fixture_id: None,
            mode: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: TestResult) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_fixture(mut self, fixture_id: impl Into<String>) -> Self {
        self.fixture_id = Some(fixture_id.into());
        self
    }

    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Write the JSON line to stderr, where the test harness captures it.
    pub fn emit(&self) {
        eprintln!("{}", self.to_json_line());
    }
}

/// `distance <= atol + rtol * scale`, the acceptance rule of every helper below.
#[must_use]
pub fn within_tolerance(actual: f64, expected: f64, atol: f64, rtol: f64) -> bool {
    (actual - expected).abs() <= atol + rtol * expected.abs()
}

/// Scalar form of [`within_tolerance`] that panics with both values.
pub fn assert_close(actual: f64, expected: f64, atol: f64, rtol: f64) {
    assert!(
        within_tolerance(actual, expected, atol, rtol),
        "assert_close: {actual} vs expected {expected} (atol={atol}, rtol={rtol})"
    );
}

/// Element-wise check on `(re, im)` pairs.
///
/// The distance is the modulus of the complex difference and the relative
/// part scales with the modulus of the expected value.
pub fn assert_close_complex_slice(
    actual: &[(f64, f64)],
    expected: &[(f64, f64)],
    atol: f64,
    rtol: f64,
) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "assert_close_complex_slice: {} values vs {} expected",
        actual.len(),
        expected.len()
    );
    for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a.0 - e.0).hypot(a.1 - e.1);
        assert!(
            within_tolerance(diff, 0.0, atol + rtol * e.0.hypot(e.1), 0.0),
            "assert_close_complex_slice[{idx}]: actual={a:?} expected={e:?} diff={diff}"
        );
    }
}
