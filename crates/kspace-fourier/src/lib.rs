#![forbid(unsafe_code)]

//! Fourier operators for k-space reconstruction.
//!
//! Two independent components:
//! - `uniform`: centered, orthonormal FFT along selected axes
//!   ([`fourier_transform_forward`], [`fourier_transform_adjoint`]).
//! - `nufft`: the non-uniform transform adapter ([`NufftAdapter`]) that
//!   canonicalizes shapes, loops a single-instance [`NufftBackend`] over
//!   channels and extra axes, and applies orthonormal scaling.
//!
//! Every call is independent and allocates its own output; the only shared
//! state is the bounded trace ledger drained by [`take_transform_traces`].

pub mod backend;
pub mod error;
pub mod helpers;
pub mod nufft;
pub mod options;
pub mod shape;
pub mod trace;
pub mod uniform;

pub use backend::{DirectNudft, NufftBackend};
pub use error::{DomainBound, FourierError, Operand, ShapeError};
pub use helpers::{centered_modes, fftshift_axis, ifftshift_axis};
pub use nufft::{
    NufftAdapter, nonuniform_fourier_transform_adjoint, nonuniform_fourier_transform_forward,
    nufft2d_type1, nufft2d_type2,
};
pub use num_complex::Complex64;
pub use options::{DEFAULT_EPS, DEFAULT_NTHREADS, NufftOptions};
pub use shape::{BatchItem, ExtraAxes, GridLayout, LocationLayout, SampleLayout};
pub use trace::{TRACE_CAPACITY, TransformTrace, take_transform_traces};
pub use uniform::{fourier_transform_adjoint, fourier_transform_forward};

use serde::Serialize;

/// Transform entrypoints recorded in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Fftn,
    Ifftn,
    NufftType1,
    NufftType2,
    NufftForward,
    NufftAdjoint,
}

#[cfg(test)]
mod tests {
    use super::TransformKind;

    #[test]
    fn transform_kind_serializes_snake_case() {
        let json = serde_json::to_string(&TransformKind::NufftType1).expect("kind serializes");
        assert_eq!(json, "\"nufft_type1\"");
    }
}
