//! Single-instance non-uniform transform primitives.
//!
//! The adapter in [`crate::nufft`] only ever talks to a [`NufftBackend`]:
//! one point set, one signal, no implicit batching. Batched execution goes
//! through [`NufftBackend::type1_batch`] / [`NufftBackend::type2_batch`],
//! whose default bodies walk [`batch_items`] and call the single-instance
//! primitive. A backend with native batching, or with per-call setup worth
//! sharing across items, overrides those two methods.

use ndarray::{
    Array1, Array2, Array3, ArrayD, ArrayView1, ArrayView2, ArrayView3, ArrayView5, ArrayViewD,
    Axis, Dimension, IxDyn,
};
use num_complex::Complex64;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::FourierError;
use crate::helpers::centered_modes;
use crate::shape::{batch_items, collapse_grid};

pub trait NufftBackend {
    /// Stable identifier used in transform traces.
    fn name(&self) -> &'static str;

    /// Type 1: non-uniform samples to a uniform grid of shape `n_modes`.
    ///
    /// `points` is `(D, N)` in radians with `D == n_modes.len()`; computes
    /// `f[k] = sum_j values[j] * exp(+i k . points[:, j])` over centered modes.
    fn type1(
        &self,
        points: ArrayView2<'_, f64>,
        values: ArrayView1<'_, Complex64>,
        n_modes: &[usize],
        eps: f64,
        nthreads: usize,
    ) -> Result<ArrayD<Complex64>, FourierError>;

    /// Type 2: a uniform `D`-dimensional grid to `N` non-uniform samples.
    ///
    /// Computes `c[j] = sum_k targets[k] * exp(-i k . points[:, j])`.
    fn type2(
        &self,
        points: ArrayView2<'_, f64>,
        targets: ArrayViewD<'_, Complex64>,
        eps: f64,
        nthreads: usize,
    ) -> Result<Array1<Complex64>, FourierError>;

    /// Type 2 over every `(channel, extra)` item.
    ///
    /// `points` is `(D, N, M)`, `grids` is `(C, R, P, S, M)` and only the grid
    /// axes listed in `kept_axes` reach the primitive. Returns `(C, N, M)`.
    fn type2_batch(
        &self,
        points: ArrayView3<'_, f64>,
        grids: ArrayView5<'_, Complex64>,
        kept_axes: &[usize],
        eps: f64,
        nthreads: usize,
    ) -> Result<Array3<Complex64>, FourierError> {
        run_type2_batch(points, grids, kept_axes, |item_points, targets| {
            self.type2(item_points, targets, eps, nthreads)
        })
    }

    /// Type 1 over every `(channel, extra)` item.
    ///
    /// `points` is `(D, N, M)`, `values` is `(C, N, M)`. Returns
    /// `(C, n_modes..., M)`.
    fn type1_batch(
        &self,
        points: ArrayView3<'_, f64>,
        values: ArrayView3<'_, Complex64>,
        n_modes: &[usize],
        eps: f64,
        nthreads: usize,
    ) -> Result<ArrayD<Complex64>, FourierError> {
        run_type1_batch(points, values, n_modes, |item_points, item_values| {
            self.type1(item_points, item_values, n_modes, eps, nthreads)
        })
    }
}

/// Drive `primitive` once per `(channel, extra)` item of a type 2 batch.
fn run_type2_batch<F>(
    points: ArrayView3<'_, f64>,
    grids: ArrayView5<'_, Complex64>,
    kept_axes: &[usize],
    mut primitive: F,
) -> Result<Array3<Complex64>, FourierError>
where
    F: FnMut(
        ArrayView2<'_, f64>,
        ArrayViewD<'_, Complex64>,
    ) -> Result<Array1<Complex64>, FourierError>,
{
    let channels = grids.len_of(Axis(0));
    let samples = points.len_of(Axis(1));
    let extra = points.len_of(Axis(2));
    let mut output = Array3::zeros((channels, samples, extra));
    for item in batch_items(channels, extra) {
        let grid = grids
            .index_axis(Axis(4), item.extra)
            .index_axis_move(Axis(0), item.channel);
        let values = primitive(
            points.index_axis(Axis(2), item.extra),
            collapse_grid(grid, kept_axes),
        )?;
        if values.len() != samples {
            return Err(FourierError::Backend {
                detail: format!(
                    "type 2 primitive returned {} samples, expected {samples}",
                    values.len()
                ),
            });
        }
        output
            .index_axis_mut(Axis(0), item.channel)
            .index_axis_move(Axis(1), item.extra)
            .assign(&values);
    }
    Ok(output)
}

/// Drive `primitive` once per `(channel, extra)` item of a type 1 batch.
fn run_type1_batch<F>(
    points: ArrayView3<'_, f64>,
    values: ArrayView3<'_, Complex64>,
    n_modes: &[usize],
    mut primitive: F,
) -> Result<ArrayD<Complex64>, FourierError>
where
    F: FnMut(
        ArrayView2<'_, f64>,
        ArrayView1<'_, Complex64>,
    ) -> Result<ArrayD<Complex64>, FourierError>,
{
    let channels = values.len_of(Axis(0));
    let extra = values.len_of(Axis(2));
    let mut shape = Vec::with_capacity(n_modes.len() + 2);
    shape.push(channels);
    shape.extend_from_slice(n_modes);
    shape.push(extra);
    let mut output = ArrayD::zeros(IxDyn(&shape));
    let extra_axis = Axis(n_modes.len());
    for item in batch_items(channels, extra) {
        let grid = primitive(
            points.index_axis(Axis(2), item.extra),
            values
                .index_axis(Axis(0), item.channel)
                .index_axis_move(Axis(1), item.extra),
        )?;
        if grid.shape() != n_modes {
            return Err(FourierError::Backend {
                detail: format!(
                    "type 1 primitive returned grid {:?}, expected {n_modes:?}",
                    grid.shape()
                ),
            });
        }
        output
            .index_axis_mut(Axis(0), item.channel)
            .index_axis_move(extra_axis, item.extra)
            .assign(&grid);
    }
    Ok(output)
}

/// Exact non-uniform DFT by direct summation.
///
/// Cost is `O(N * prod(n_modes) * D)` per call; the result is exact up to
/// floating-point rounding, so any positive `eps` is met. With `nthreads > 1`
/// the output entries are computed on a dedicated pool of that many workers,
/// built once per batched call and shared by all of its items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectNudft;

impl NufftBackend for DirectNudft {
    fn name(&self) -> &'static str {
        "direct_nudft"
    }

    fn type1(
        &self,
        points: ArrayView2<'_, f64>,
        values: ArrayView1<'_, Complex64>,
        n_modes: &[usize],
        _eps: f64,
        nthreads: usize,
    ) -> Result<ArrayD<Complex64>, FourierError> {
        let pool = worker_pool(nthreads)?;
        direct_type1(points, values, n_modes, pool.as_ref())
    }

    fn type2(
        &self,
        points: ArrayView2<'_, f64>,
        targets: ArrayViewD<'_, Complex64>,
        _eps: f64,
        nthreads: usize,
    ) -> Result<Array1<Complex64>, FourierError> {
        let pool = worker_pool(nthreads)?;
        direct_type2(points, targets, pool.as_ref())
    }

    fn type2_batch(
        &self,
        points: ArrayView3<'_, f64>,
        grids: ArrayView5<'_, Complex64>,
        kept_axes: &[usize],
        _eps: f64,
        nthreads: usize,
    ) -> Result<Array3<Complex64>, FourierError> {
        let pool = worker_pool(nthreads)?;
        run_type2_batch(points, grids, kept_axes, |item_points, targets| {
            direct_type2(item_points, targets, pool.as_ref())
        })
    }

    fn type1_batch(
        &self,
        points: ArrayView3<'_, f64>,
        values: ArrayView3<'_, Complex64>,
        n_modes: &[usize],
        _eps: f64,
        nthreads: usize,
    ) -> Result<ArrayD<Complex64>, FourierError> {
        let pool = worker_pool(nthreads)?;
        run_type1_batch(points, values, n_modes, |item_points, item_values| {
            direct_type1(item_points, item_values, n_modes, pool.as_ref())
        })
    }
}

fn direct_type1(
    points: ArrayView2<'_, f64>,
    values: ArrayView1<'_, Complex64>,
    n_modes: &[usize],
    pool: Option<&ThreadPool>,
) -> Result<ArrayD<Complex64>, FourierError> {
    check_points(points, n_modes.len())?;
    if values.len() != points.ncols() {
        return Err(FourierError::Backend {
            detail: format!(
                "{} values supplied for {} points",
                values.len(),
                points.ncols()
            ),
        });
    }

    let phases = phase_tables(points, n_modes, 1.0);
    let total = n_modes.iter().product::<usize>();
    let entry = |flat: usize| -> Complex64 {
        let index = unravel(flat, n_modes);
        values
            .iter()
            .enumerate()
            .map(|(sample, &value)| value * phase_product(&phases, sample, &index))
            .sum()
    };
    let entries = evaluate(total, pool, entry);
    ArrayD::from_shape_vec(IxDyn(n_modes), entries).map_err(|err| FourierError::Backend {
        detail: err.to_string(),
    })
}

fn direct_type2(
    points: ArrayView2<'_, f64>,
    targets: ArrayViewD<'_, Complex64>,
    pool: Option<&ThreadPool>,
) -> Result<Array1<Complex64>, FourierError> {
    check_points(points, targets.ndim())?;

    let phases = phase_tables(points, targets.shape(), -1.0);
    let entry = |sample: usize| -> Complex64 {
        targets
            .indexed_iter()
            .map(|(index, &value)| value * phase_product(&phases, sample, index.slice()))
            .sum()
    };
    Ok(Array1::from_vec(evaluate(points.ncols(), pool, entry)))
}

/// Evaluate `entry` for `0..len`, on `pool` when one is given.
fn evaluate<F>(len: usize, pool: Option<&ThreadPool>, entry: F) -> Vec<Complex64>
where
    F: Fn(usize) -> Complex64 + Sync + Send,
{
    match pool {
        Some(pool) => pool.install(|| (0..len).into_par_iter().map(&entry).collect()),
        None => (0..len).map(entry).collect(),
    }
}

fn check_points(points: ArrayView2<'_, f64>, dims: usize) -> Result<(), FourierError> {
    if points.nrows() != dims {
        return Err(FourierError::Backend {
            detail: format!(
                "point set has {} coordinate rows but the grid is {dims}-dimensional",
                points.nrows()
            ),
        });
    }
    Ok(())
}

/// `None` for a single thread; otherwise a pool of exactly `nthreads` workers.
fn worker_pool(nthreads: usize) -> Result<Option<ThreadPool>, FourierError> {
    if nthreads <= 1 {
        return Ok(None);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(nthreads)
        .build()
        .map(Some)
        .map_err(|err| FourierError::Backend {
            detail: err.to_string(),
        })
}

/// Row-major multi-index of `flat` within `shape`.
fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &len) in index.iter_mut().zip(shape).rev() {
        *slot = flat % len;
        flat /= len;
    }
    index
}

/// Per-axis tables `exp(sign * i * mode * x)` of shape `(N, len)`.
fn phase_tables(points: ArrayView2<'_, f64>, shape: &[usize], sign: f64) -> Vec<Array2<Complex64>> {
    shape
        .iter()
        .enumerate()
        .map(|(axis, &len)| {
            let modes = centered_modes(len);
            Array2::from_shape_fn((points.ncols(), len), |(sample, mode)| {
                Complex64::from_polar(1.0, sign * modes[mode] * points[[axis, sample]])
            })
        })
        .collect()
}

fn phase_product(phases: &[Array2<Complex64>], sample: usize, index: &[usize]) -> Complex64 {
    phases
        .iter()
        .zip(index)
        .map(|(table, &position)| table[[sample, position]])
        .product()
}
