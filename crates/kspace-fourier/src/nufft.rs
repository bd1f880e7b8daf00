//! Non-uniform Fourier transform adapter.
//!
//! Normalizes variably-ranked sampling locations and data into fixed
//! layouts, runs the single-instance primitives of a [`NufftBackend`] over
//! every channel and flattened extra index, applies orthonormal scaling and
//! restores the caller's axis layout.
//!
//! Sampling locations `k` are given in cycles per unit in `[-0.5, 0.5]`; the
//! adapter rescales them by `2 * pi` before they reach the backend.

use std::f64::consts::TAU;
use std::time::Instant;

use ndarray::{Array1, Array2, Array3, ArrayD, Ix2, IxDyn};
use num_complex::Complex64;

use crate::TransformKind;
use crate::backend::{DirectNudft, NufftBackend};
use crate::error::{FourierError, ShapeError};
use crate::options::NufftOptions;
use crate::shape::{
    canonicalize_grid, canonicalize_locations, canonicalize_samples, ensure_finite_data,
    ensure_finite_locations, validate_locations_domain,
};
use crate::trace::{TransformTrace, next_operation_id, record_trace};

/// Dispatches forward/adjoint non-uniform transforms to a backend.
#[derive(Debug, Clone, Default)]
pub struct NufftAdapter<B = DirectNudft> {
    backend: B,
}

impl<B: NufftBackend> NufftAdapter<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Grid to non-uniform samples.
    ///
    /// `k` is `(D, N)` or `(D, N, extra...)`, `x` is `(C, R, P, S)` or
    /// `(C, R, P, S, extra...)` with matching extra axes. Returns `(C, N)` or
    /// `(C, N, extra...)`, scaled by `1 / sqrt(R * P * S)`.
    ///
    /// Extra axes are dropped from the output only when the caller supplied
    /// none. An explicit singleton extra axis is kept, so `x` of shape
    /// `(1, 2, 2, 1, 1)` with `k` of shape `(2, 4, 1)` yields `(1, 4, 1)`,
    /// not `(1, 4)` as in implementations that squeeze any `[1]` tail.
    pub fn forward(
        &self,
        k: &ArrayD<f64>,
        x: &ArrayD<Complex64>,
        options: &NufftOptions,
    ) -> Result<ArrayD<Complex64>, FourierError> {
        validate_locations_domain(k)?;
        options.validate()?;
        if options.should_check_finite() {
            ensure_finite_locations(k)?;
            ensure_finite_data(x)?;
        }

        let grid = canonicalize_grid(x.shape())?;
        let locations = canonicalize_locations(k.shape())?;
        grid.extra.ensure_matches(&locations.extra)?;
        grid.ensure_addressable(locations.dims)?;
        let kept_axes = grid.kept_axes(locations.dims);

        let started = Instant::now();
        let norm = (grid.grid_len() as f64).sqrt();
        let extra = grid.extra.len();
        let [read, phase1, phase2] = grid.grid;

        let points = flatten_locations(k, locations.dims, locations.samples, extra)?;
        let flat_shape = [grid.channels, read, phase1, phase2, extra];
        let grids = x
            .to_shape((grid.channels, read, phase1, phase2, extra))
            .map_err(|_| reshape_error(x.shape(), &flat_shape))?;

        let mut samples = self.backend.type2_batch(
            points.view(),
            grids.view(),
            &kept_axes,
            options.eps,
            options.nthreads,
        )?;
        samples.mapv_inplace(|value| value / norm);

        let mut out_shape = vec![grid.channels, locations.samples];
        out_shape.extend_from_slice(grid.extra.output_sizes());
        let output = samples
            .into_shape_with_order(IxDyn(&out_shape))
            .map_err(|_| reshape_error(&[grid.channels, locations.samples, extra], &out_shape))?;

        self.trace(
            TransformKind::NufftForward,
            "forward",
            &output,
            grid.channels * extra,
            options,
            started,
        );
        Ok(output)
    }

    /// Non-uniform samples to a grid of shape `n_modes`.
    ///
    /// `k` is `(D, N)` or `(D, N, extra...)` with `D == n_modes.len()`; `x` is
    /// `(N,)`, `(C, N)` or `(C, N, extra...)`. Returns
    /// `(C, n1, n2 | 1, n3 | 1)` followed by the caller's extra axes, scaled
    /// by `1 / sqrt(prod(n_modes))`.
    ///
    /// An explicit singleton extra axis on `x` is kept in the output, as for
    /// [`Self::forward`].
    pub fn adjoint(
        &self,
        k: &ArrayD<f64>,
        x: &ArrayD<Complex64>,
        n_modes: &[usize],
        options: &NufftOptions,
    ) -> Result<ArrayD<Complex64>, FourierError> {
        validate_locations_domain(k)?;
        let locations = canonicalize_locations(k.shape())?;
        if n_modes.len() != locations.dims {
            return Err(ShapeError::ModeCountMismatch {
                dims: locations.dims,
                modes: n_modes.len(),
            }
            .into());
        }
        if let Some(axis) = n_modes.iter().position(|&len| len == 0) {
            return Err(ShapeError::EmptyMode { axis }.into());
        }
        options.validate()?;
        if options.should_check_finite() {
            ensure_finite_locations(k)?;
            ensure_finite_data(x)?;
        }

        let signal = canonicalize_samples(x.shape())?;
        if signal.samples != locations.samples {
            return Err(ShapeError::SampleCountMismatch {
                data: signal.samples,
                locations: locations.samples,
            }
            .into());
        }
        signal.extra.ensure_matches(&locations.extra)?;

        let started = Instant::now();
        let norm = (n_modes.iter().product::<usize>() as f64).sqrt();
        let extra = signal.extra.len();

        let points = flatten_locations(k, locations.dims, locations.samples, extra)?;
        let flat_shape = [signal.channels, signal.samples, extra];
        let values = x
            .to_shape((signal.channels, signal.samples, extra))
            .map_err(|_| reshape_error(x.shape(), &flat_shape))?;

        let mut grid = self.backend.type1_batch(
            points.view(),
            values.view(),
            n_modes,
            options.eps,
            options.nthreads,
        )?;
        grid.mapv_inplace(|value| value / norm);

        let mut out_shape = Vec::with_capacity(4 + signal.extra.sizes().len());
        out_shape.push(signal.channels);
        out_shape.extend_from_slice(n_modes);
        out_shape.resize(4, 1);
        out_shape.extend_from_slice(signal.extra.output_sizes());
        let flat_grid = grid.shape().to_vec();
        let output = grid
            .into_shape_with_order(IxDyn(&out_shape))
            .map_err(|_| reshape_error(&flat_grid, &out_shape))?;

        self.trace(
            TransformKind::NufftAdjoint,
            "adjoint",
            &output,
            signal.channels * extra,
            options,
            started,
        );
        Ok(output)
    }

    fn trace(
        &self,
        kind: TransformKind,
        direction: &'static str,
        output: &ArrayD<Complex64>,
        batch_items: usize,
        options: &NufftOptions,
        started: Instant,
    ) {
        record_trace(TransformTrace {
            operation_id: next_operation_id(),
            kind,
            direction,
            shape: output.shape().to_vec(),
            batch_items,
            backend: self.backend.name(),
            mode: Some(options.mode),
            timing_ns: started.elapsed().as_nanos(),
        });
    }
}

/// `(D, N, extra...)` to `(D, N, M)` in radians.
fn flatten_locations(
    k: &ArrayD<f64>,
    dims: usize,
    samples: usize,
    extra: usize,
) -> Result<Array3<f64>, FourierError> {
    let flat = k
        .to_shape((dims, samples, extra))
        .map_err(|_| reshape_error(k.shape(), &[dims, samples, extra]))?;
    Ok(flat.mapv(|value| value * TAU))
}

fn reshape_error(from: &[usize], to: &[usize]) -> FourierError {
    ShapeError::Reshape {
        from: from.to_vec(),
        to: to.to_vec(),
    }
    .into()
}

/// Forward non-uniform transform with the direct backend and default threads.
pub fn nonuniform_fourier_transform_forward(
    k: &ArrayD<f64>,
    x: &ArrayD<Complex64>,
    eps: f64,
) -> Result<ArrayD<Complex64>, FourierError> {
    let options = NufftOptions::default().with_eps(eps);
    NufftAdapter::<DirectNudft>::default().forward(k, x, &options)
}

/// Adjoint non-uniform transform with the direct backend.
pub fn nonuniform_fourier_transform_adjoint(
    k: &ArrayD<f64>,
    x: &ArrayD<Complex64>,
    n_modes: &[usize],
    eps: f64,
    nthreads: usize,
) -> Result<ArrayD<Complex64>, FourierError> {
    let options = NufftOptions::default()
        .with_eps(eps)
        .with_nthreads(nthreads);
    NufftAdapter::<DirectNudft>::default().adjoint(k, x, n_modes, &options)
}

/// Unbatched, unscaled 2D type 1 call.
///
/// `k` is `(2, N)` in radians, `x` holds the `N` sample values. No domain
/// check, rescaling or normalization is applied.
pub fn nufft2d_type1(
    k: &Array2<f64>,
    x: &Array1<Complex64>,
    n_modes: (usize, usize),
    eps: f64,
    nthreads: usize,
) -> Result<Array2<Complex64>, FourierError> {
    ensure_two_rows(k)?;
    let options = NufftOptions::default()
        .with_eps(eps)
        .with_nthreads(nthreads);
    options.validate()?;
    let started = Instant::now();
    let backend = DirectNudft;
    let grid = backend.type1(k.view(), x.view(), &[n_modes.0, n_modes.1], eps, nthreads)?;
    let grid = grid
        .into_dimensionality::<Ix2>()
        .map_err(|_| reshape_error(&[n_modes.0, n_modes.1], &[n_modes.0, n_modes.1]))?;
    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind: TransformKind::NufftType1,
        direction: "adjoint",
        shape: grid.shape().to_vec(),
        batch_items: 1,
        backend: backend.name(),
        mode: Some(options.mode),
        timing_ns: started.elapsed().as_nanos(),
    });
    Ok(grid)
}

/// Unbatched, unscaled 2D type 2 call.
///
/// `k` is `(2, N)` in radians and `x` is the uniform grid.
pub fn nufft2d_type2(
    k: &Array2<f64>,
    x: &Array2<Complex64>,
    eps: f64,
    nthreads: usize,
) -> Result<Array1<Complex64>, FourierError> {
    ensure_two_rows(k)?;
    let options = NufftOptions::default()
        .with_eps(eps)
        .with_nthreads(nthreads);
    options.validate()?;
    let started = Instant::now();
    let backend = DirectNudft;
    let samples = backend.type2(k.view(), x.view().into_dyn(), eps, nthreads)?;
    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind: TransformKind::NufftType2,
        direction: "forward",
        shape: samples.shape().to_vec(),
        batch_items: 1,
        backend: backend.name(),
        mode: Some(options.mode),
        timing_ns: started.elapsed().as_nanos(),
    });
    Ok(samples)
}

fn ensure_two_rows(k: &Array2<f64>) -> Result<(), FourierError> {
    if k.nrows() != 2 {
        return Err(ShapeError::ModeCountMismatch {
            dims: k.nrows(),
            modes: 2,
        }
        .into());
    }
    Ok(())
}
