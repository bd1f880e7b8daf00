//! Canonical layouts for the non-uniform transform adapter.
//!
//! Callers hand in arrays whose rank varies: sampling locations may or may
//! not carry extra axes, sample data may lack a channel axis, and so on.
//! The `canonicalize_*` functions turn a raw shape into a fixed-rank
//! descriptor once, so the transform loops never branch on rank.

use ndarray::{ArrayD, ArrayView3, ArrayViewD, Axis};
use num_complex::Complex64;

use crate::error::{DomainBound, FourierError, Operand, ShapeError};

/// Trailing batch-like axes carried through a transform unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraAxes {
    sizes: Vec<usize>,
    synthetic: bool,
}

impl ExtraAxes {
    /// Extra axes from the tail of a shape; an empty tail becomes a single
    /// synthetic axis of length one.
    #[must_use]
    pub fn from_tail(tail: &[usize]) -> Self {
        if tail.is_empty() {
            Self {
                sizes: vec![1],
                synthetic: true,
            }
        } else {
            Self {
                sizes: tail.to_vec(),
                synthetic: false,
            }
        }
    }

    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// True when the caller supplied no extra axes at all.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Flattened length `M`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axes handed back to the caller: none if synthetic.
    #[must_use]
    pub fn output_sizes(&self) -> &[usize] {
        if self.synthetic { &[] } else { &self.sizes[..] }
    }

    /// Sizes must agree elementwise; synthetic `[1]` equals an explicit `[1]`.
    pub fn ensure_matches(&self, locations: &ExtraAxes) -> Result<(), ShapeError> {
        if self.sizes != locations.sizes {
            return Err(ShapeError::ExtraAxesMismatch {
                data: self.sizes.clone(),
                locations: locations.sizes.clone(),
            });
        }
        Ok(())
    }
}

/// Sampling locations `k` as `(D, N, extra...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationLayout {
    pub dims: usize,
    pub samples: usize,
    pub extra: ExtraAxes,
}

/// Uniform grid data as `(C, R, P, S, extra...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub channels: usize,
    pub grid: [usize; 3],
    pub extra: ExtraAxes,
}

/// Non-uniform sample data as `(C, N, extra...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLayout {
    pub channels: usize,
    pub samples: usize,
    pub extra: ExtraAxes,
}

pub fn canonicalize_locations(shape: &[usize]) -> Result<LocationLayout, ShapeError> {
    let [dims, samples, tail @ ..] = shape else {
        return Err(ShapeError::RankTooLow {
            operand: Operand::Locations,
            minimum: 2,
            actual: shape.len(),
            layout: "dim, samples",
        });
    };
    if !(1..=3).contains(dims) {
        return Err(ShapeError::UnsupportedDimensionality { dims: *dims });
    }
    Ok(LocationLayout {
        dims: *dims,
        samples: *samples,
        extra: ExtraAxes::from_tail(tail),
    })
}

pub fn canonicalize_grid(shape: &[usize]) -> Result<GridLayout, ShapeError> {
    let [channels, read, phase1, phase2, tail @ ..] = shape else {
        return Err(ShapeError::RankTooLow {
            operand: Operand::Data,
            minimum: 4,
            actual: shape.len(),
            layout: "channel, read, phase1, phase2",
        });
    };
    Ok(GridLayout {
        channels: *channels,
        grid: [*read, *phase1, *phase2],
        extra: ExtraAxes::from_tail(tail),
    })
}

/// Accepts `(N,)`, `(C, N)` and `(C, N, extra...)`.
pub fn canonicalize_samples(shape: &[usize]) -> Result<SampleLayout, ShapeError> {
    match shape {
        [] => Err(ShapeError::RankTooLow {
            operand: Operand::Data,
            minimum: 1,
            actual: 0,
            layout: "samples",
        }),
        [samples] => Ok(SampleLayout {
            channels: 1,
            samples: *samples,
            extra: ExtraAxes::from_tail(&[]),
        }),
        [channels, samples, tail @ ..] => Ok(SampleLayout {
            channels: *channels,
            samples: *samples,
            extra: ExtraAxes::from_tail(tail),
        }),
    }
}

impl GridLayout {
    /// Product `R * P * S`.
    #[must_use]
    pub fn grid_len(&self) -> usize {
        self.grid.iter().product()
    }

    /// Check that the grid can be addressed by `dims`-dimensional locations.
    pub fn ensure_addressable(&self, dims: usize) -> Result<(), ShapeError> {
        if let Some(axis) = self.grid.iter().position(|&len| len == 0) {
            return Err(ShapeError::EmptyMode { axis });
        }
        let singletons = self.grid.iter().filter(|&&len| len == 1).count();
        let [read, phase1, phase2] = self.grid;
        match dims {
            1 if read * phase1 * phase2 != read.max(phase1).max(phase2) => {
                Err(ShapeError::AxisCollapse {
                    dims,
                    grid: self.grid,
                    rule: "two of the data dimensions (R, P, S) must be 1",
                })
            }
            2 if singletons == 0 => Err(ShapeError::AxisCollapse {
                dims,
                grid: self.grid,
                rule: "one of the data dimensions (R, P, S) must be 1",
            }),
            _ => Ok(()),
        }
    }

    /// Grid axes (indices into `[R, P, S]`) kept for `dims`-dimensional
    /// locations. Singleton axes are dropped from the trailing end until
    /// exactly `dims` remain; call after [`Self::ensure_addressable`].
    #[must_use]
    pub fn kept_axes(&self, dims: usize) -> Vec<usize> {
        let mut kept = vec![0, 1, 2];
        for axis in (0..3).rev() {
            if kept.len() <= dims {
                break;
            }
            if self.grid[axis] == 1 {
                kept.retain(|&candidate| candidate != axis);
            }
        }
        kept
    }
}

/// View one `(R, P, S)` grid with every axis outside `kept` indexed away.
#[must_use]
pub fn collapse_grid<'a>(
    grid: ArrayView3<'a, Complex64>,
    kept: &[usize],
) -> ArrayViewD<'a, Complex64> {
    let mut view = grid.into_dyn();
    for axis in (0..3).rev() {
        if !kept.contains(&axis) {
            view.index_axis_inplace(Axis(axis), 0);
        }
    }
    view
}

/// One unit of work: a channel paired with a flattened extra-axis index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchItem {
    pub channel: usize,
    pub extra: usize,
}

/// Channel-major walk over the flattened `channels x extra` index space.
pub fn batch_items(channels: usize, extra: usize) -> impl Iterator<Item = BatchItem> {
    (0..channels).flat_map(move |channel| (0..extra).map(move |index| BatchItem {
        channel,
        extra: index,
    }))
}

/// Every location must lie in `[-0.5, 0.5]`.
///
/// The first element below the lower bound is reported ahead of any element
/// above the upper bound. NaN compares false against both and passes.
pub fn validate_locations_domain(k: &ArrayD<f64>) -> Result<(), FourierError> {
    let lower = DomainBound::Lower.value();
    let upper = DomainBound::Upper.value();
    first_violation(k, DomainBound::Lower, |v| v < lower)?;
    first_violation(k, DomainBound::Upper, |v| v > upper)
}

fn first_violation(
    k: &ArrayD<f64>,
    bound: DomainBound,
    violates: impl Fn(f64) -> bool,
) -> Result<(), FourierError> {
    match k.iter().enumerate().find(|&(_, &v)| violates(v)) {
        Some((index, &value)) => Err(FourierError::Domain {
            bound,
            value,
            index,
        }),
        None => Ok(()),
    }
}

pub fn ensure_finite_locations(k: &ArrayD<f64>) -> Result<(), FourierError> {
    if k.iter().any(|value| !value.is_finite()) {
        return Err(FourierError::NonFiniteInput);
    }
    Ok(())
}

pub fn ensure_finite_data(x: &ArrayD<Complex64>) -> Result<(), FourierError> {
    if x.iter().any(|value| !value.is_finite()) {
        return Err(FourierError::NonFiniteInput);
    }
    Ok(())
}
