use kspace_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::error::FourierError;

/// Accuracy requested from the non-uniform primitives when none is given.
pub const DEFAULT_EPS: f64 = 1e-6;

/// Worker count handed to the non-uniform primitives when none is given.
pub const DEFAULT_NTHREADS: usize = 1;

/// Common options shared by the non-uniform transform entrypoints.
///
/// `eps` and `nthreads` are passed through unchanged to the backend; the
/// adapter itself only checks that they are usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NufftOptions {
    pub eps: f64,
    pub nthreads: usize,
    pub mode: RuntimeMode,
    pub check_finite: bool,
}

impl Default for NufftOptions {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            nthreads: DEFAULT_NTHREADS,
            mode: RuntimeMode::Strict,
            check_finite: false,
        }
    }
}

impl NufftOptions {
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    #[must_use]
    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = nthreads;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_check_finite(mut self, check_finite: bool) -> Self {
        self.check_finite = check_finite;
        self
    }

    /// Whether NaN/inf in locations or data must be rejected.
    #[must_use]
    pub fn should_check_finite(&self) -> bool {
        self.check_finite || self.mode.rejects_non_finite()
    }

    pub fn validate(&self) -> Result<(), FourierError> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(FourierError::InvalidOptions {
                detail: "eps must be finite and greater than zero",
            });
        }
        if self.nthreads == 0 {
            return Err(FourierError::InvalidOptions {
                detail: "nthreads must be at least one",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kspace_runtime::RuntimeMode;

    use super::{DEFAULT_EPS, NufftOptions};
    use crate::error::FourierError;

    #[test]
    fn defaults_match_reference_toolkit() {
        let opts = NufftOptions::default();
        assert_eq!(opts.eps, DEFAULT_EPS);
        assert_eq!(opts.nthreads, 1);
        assert_eq!(opts.mode, RuntimeMode::Strict);
        assert!(!opts.should_check_finite());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn hardened_mode_implies_finite_checks() {
        let opts = NufftOptions::default().with_mode(RuntimeMode::Hardened);
        assert!(opts.should_check_finite());
        assert!(NufftOptions::default().with_check_finite(true).should_check_finite());
    }

    #[test]
    fn non_positive_eps_and_zero_threads_are_rejected() {
        for eps in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let err = NufftOptions::default()
                .with_eps(eps)
                .validate()
                .expect_err("eps must be rejected");
            assert!(matches!(err, FourierError::InvalidOptions { .. }));
        }
        let err = NufftOptions::default()
            .with_nthreads(0)
            .validate()
            .expect_err("zero threads must be rejected");
        assert_eq!(
            err,
            FourierError::InvalidOptions {
                detail: "nthreads must be at least one"
            }
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let opts: NufftOptions =
            serde_json::from_str(r#"{"eps":1e-9,"mode":"Hardened"}"#).expect("valid config");
        assert_eq!(opts.eps, 1e-9);
        assert_eq!(opts.nthreads, 1);
        assert_eq!(opts.mode, RuntimeMode::Hardened);
    }
}
