use thiserror::Error;

/// Edge of the normalized frequency interval `[-0.5, 0.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainBound {
    Lower,
    Upper,
}

impl DomainBound {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Lower => -0.5,
            Self::Upper => 0.5,
        }
    }
}

impl std::fmt::Display for DomainBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lower => write!(f, "lower bound -0.5"),
            Self::Upper => write!(f, "upper bound 0.5"),
        }
    }
}

/// Which array argument a shape complaint refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Sampling locations `k`.
    Locations,
    /// Grid or sample data `x`.
    Data,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locations => write!(f, "sampling locations k"),
            Self::Data => write!(f, "input data x"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{operand} must have at least {minimum} axes ({layout}) but has {actual}")]
    RankTooLow {
        operand: Operand,
        minimum: usize,
        actual: usize,
        layout: &'static str,
    },
    #[error("the additional axes in x and k must be the same but are {data:?} and {locations:?}")]
    ExtraAxesMismatch {
        data: Vec<usize>,
        locations: Vec<usize>,
    },
    #[error("the number of samples in x and k must be the same but are {data} and {locations}")]
    SampleCountMismatch { data: usize, locations: usize },
    #[error(
        "the number of dimensions in n_modes must match the number of dimensions in k but are {modes} and {dims}"
    )]
    ModeCountMismatch { dims: usize, modes: usize },
    #[error("for {dims}D sampling locations {rule}, got grid axes (R, P, S) = {grid:?}")]
    AxisCollapse {
        dims: usize,
        grid: [usize; 3],
        rule: &'static str,
    },
    #[error("sampling locations must be 1D, 2D or 3D but k describes {dims} dimensions")]
    UnsupportedDimensionality { dims: usize },
    #[error("grid axis {axis} has zero length")]
    EmptyMode { axis: usize },
    #[error("cannot reshape {from:?} into {to:?}")]
    Reshape { from: Vec<usize>, to: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FourierError {
    #[error(
        "non-uniform sampling points k must be scaled between -0.5 and 0.5: element {index} = {value} violates the {bound}"
    )]
    Domain {
        bound: DomainBound,
        value: f64,
        index: usize,
    },
    #[error("invalid shape: {0}")]
    Shape(#[from] ShapeError),
    #[error("axis {axis} is out of range for an array with {ndim} axes")]
    InvalidAxis { axis: usize, ndim: usize },
    #[error("axis {axis} appears more than once")]
    DuplicateAxis { axis: usize },
    #[error("invalid options: {detail}")]
    InvalidOptions { detail: &'static str },
    #[error("non-finite input rejected by policy")]
    NonFiniteInput,
    #[error("transform backend failed: {detail}")]
    Backend { detail: String },
}

impl FourierError {
    #[must_use]
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }

    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{DomainBound, FourierError, ShapeError};

    #[test]
    fn extra_axes_message_reports_both_shapes() {
        let err = FourierError::from(ShapeError::ExtraAxesMismatch {
            data: vec![5],
            locations: vec![3],
        });
        assert!(err.is_shape());
        assert_eq!(
            err.to_string(),
            "invalid shape: the additional axes in x and k must be the same but are [5] and [3]"
        );
    }

    #[test]
    fn domain_message_names_the_violated_bound() {
        let err = FourierError::Domain {
            bound: DomainBound::Upper,
            value: 0.75,
            index: 3,
        };
        assert!(err.is_domain());
        assert!(err.to_string().contains("upper bound 0.5"));
        assert_eq!(DomainBound::Lower.value(), -0.5);
    }
}
