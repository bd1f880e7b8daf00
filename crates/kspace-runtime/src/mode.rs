#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing how much input validation a transform performs.
///
/// - **Strict**: Reproduce the reference reconstruction toolkit exactly. Only
///   the documented domain and shape checks run; a NaN sampling location
///   slips through the `[-0.5, 0.5]` bound check because NaN compares false.
/// - **Hardened**: Additionally rejects non-finite sampling locations and
///   signal values before any transform work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    /// Whether non-finite input must be rejected regardless of caller options.
    #[must_use]
    pub const fn rejects_non_finite(self) -> bool {
        matches!(self, Self::Hardened)
    }
}
