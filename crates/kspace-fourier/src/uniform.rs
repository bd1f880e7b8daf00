//! Centered, orthonormal uniform FFT along selected axes.

use std::sync::Arc;
use std::time::Instant;

use ndarray::{ArrayD, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::TransformKind;
use crate::error::FourierError;
use crate::helpers::{fftshift_axis, ifftshift_axis};
use crate::trace::{TransformTrace, next_operation_id, record_trace};

/// Centered forward FFT with orthonormal scaling along `axes`.
///
/// The zero-frequency sample is moved to the start of each axis, the
/// transform is applied, and the result is shifted back so the zero mode sits
/// at index `n/2`. The output has the same shape as `x`.
pub fn fourier_transform_forward(
    x: &ArrayD<Complex64>,
    axes: &[usize],
) -> Result<ArrayD<Complex64>, FourierError> {
    run_centered(TransformKind::Fftn, x, axes, FftDirection::Forward)
}

/// Centered inverse FFT with orthonormal scaling along `axes`.
///
/// Exact inverse of [`fourier_transform_forward`] over the same axes.
pub fn fourier_transform_adjoint(
    x: &ArrayD<Complex64>,
    axes: &[usize],
) -> Result<ArrayD<Complex64>, FourierError> {
    run_centered(TransformKind::Ifftn, x, axes, FftDirection::Inverse)
}

fn run_centered(
    kind: TransformKind,
    x: &ArrayD<Complex64>,
    axes: &[usize],
    direction: FftDirection,
) -> Result<ArrayD<Complex64>, FourierError> {
    validate_axes(axes, x.ndim())?;

    let started = Instant::now();
    let mut data = x.clone();
    if !data.is_empty() {
        for &axis in axes {
            data = ifftshift_axis(&data, axis);
        }

        let mut planner = FftPlanner::<f64>::new();
        for &axis in axes {
            let plan = planner.plan_fft(data.len_of(Axis(axis)), direction);
            transform_axis(&mut data, axis, &plan);
        }

        for &axis in axes {
            data = fftshift_axis(&data, axis);
        }

        let total = axes
            .iter()
            .map(|&axis| data.len_of(Axis(axis)))
            .product::<usize>();
        let scale = 1.0 / (total as f64).sqrt();
        data.mapv_inplace(|value| value * scale);
    }

    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind,
        direction: match direction {
            FftDirection::Forward => "forward",
            FftDirection::Inverse => "inverse",
        },
        shape: data.shape().to_vec(),
        batch_items: 1,
        backend: "rustfft",
        mode: None,
        timing_ns: started.elapsed().as_nanos(),
    });

    Ok(data)
}

fn validate_axes(axes: &[usize], ndim: usize) -> Result<(), FourierError> {
    for (position, &axis) in axes.iter().enumerate() {
        if axis >= ndim {
            return Err(FourierError::InvalidAxis { axis, ndim });
        }
        if axes[..position].contains(&axis) {
            return Err(FourierError::DuplicateAxis { axis });
        }
    }
    Ok(())
}

/// Unscaled in-place transform of every lane along `axis`.
fn transform_axis(data: &mut ArrayD<Complex64>, axis: usize, plan: &Arc<dyn Fft<f64>>) {
    let len = data.len_of(Axis(axis));
    if len <= 1 {
        return;
    }
    let mut buffer = vec![Complex64::new(0.0, 0.0); len];
    let mut scratch = vec![Complex64::new(0.0, 0.0); plan.get_inplace_scratch_len()];
    for mut lane in data.lanes_mut(Axis(axis)) {
        for (slot, value) in buffer.iter_mut().zip(lane.iter()) {
            *slot = *value;
        }
        plan.process_with_scratch(&mut buffer, &mut scratch);
        for (value, slot) in lane.iter_mut().zip(buffer.iter()) {
            *value = *slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use kspace_runtime::assert_close_complex_slice;
    use ndarray::{ArrayD, IxDyn};
    use num_complex::Complex64;

    use super::{fourier_transform_adjoint, fourier_transform_forward};
    use crate::error::FourierError;

    fn pairs(data: &ArrayD<Complex64>) -> Vec<(f64, f64)> {
        data.iter().map(|c| (c.re, c.im)).collect()
    }

    fn ramp(shape: &[usize]) -> ArrayD<Complex64> {
        let len = shape.iter().product::<usize>();
        ArrayD::from_shape_vec(
            IxDyn(shape),
            (0..len)
                .map(|i| Complex64::new(i as f64 * 0.5 - 1.0, (i % 3) as f64))
                .collect(),
        )
        .expect("shape matches data")
    }

    #[test]
    fn centered_impulse_maps_to_flat_spectrum() {
        let mut x = ArrayD::<Complex64>::zeros(IxDyn(&[4, 4]));
        x[[2, 2]] = Complex64::new(1.0, 0.0);
        let spectrum = fourier_transform_forward(&x, &[0, 1]).expect("fft succeeds");
        for value in &spectrum {
            assert!((value.re - 0.25).abs() < 1e-12);
            assert!(value.im.abs() < 1e-12);
        }
    }

    #[test]
    fn centered_dc_maps_to_centered_impulse() {
        let x = ArrayD::from_elem(IxDyn(&[5]), Complex64::new(1.0, 0.0));
        let spectrum = fourier_transform_forward(&x, &[0]).expect("fft succeeds");
        assert!((spectrum[[2]].re - 5.0_f64.sqrt()).abs() < 1e-12);
        for idx in [0, 1, 3, 4] {
            assert!(spectrum[[idx]].norm() < 1e-12);
        }
    }

    #[test]
    fn forward_adjoint_roundtrip_identity() {
        let x = ramp(&[3, 4, 5]);
        for axes in [vec![0], vec![1, 2], vec![2, 0, 1]] {
            let spectrum = fourier_transform_forward(&x, &axes).expect("fft succeeds");
            assert_eq!(spectrum.shape(), x.shape());
            let recovered = fourier_transform_adjoint(&spectrum, &axes).expect("ifft succeeds");
            assert_close_complex_slice(&pairs(&recovered), &pairs(&x), 1e-10, 0.0);
        }
    }

    #[test]
    fn empty_axes_returns_copy() {
        let x = ramp(&[2, 3]);
        let out = fourier_transform_forward(&x, &[]).expect("no-op succeeds");
        assert_eq!(out, x);
    }

    #[test]
    fn out_of_range_axis_is_rejected() {
        let err = fourier_transform_forward(&ramp(&[2, 2]), &[2]).expect_err("axis 2 is invalid");
        assert_eq!(err, FourierError::InvalidAxis { axis: 2, ndim: 2 });
    }

    #[test]
    fn duplicate_axis_is_rejected() {
        let err =
            fourier_transform_adjoint(&ramp(&[2, 2]), &[1, 1]).expect_err("repeated axis");
        assert_eq!(err, FourierError::DuplicateAxis { axis: 1 });
    }

    #[test]
    fn uniform_traces_carry_no_validation_mode() {
        let _drain = crate::trace::DRAIN_GUARD
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let x = ramp(&[7, 3]);
        let _ = fourier_transform_adjoint(&x, &[0]).expect("ifft succeeds");
        let traces = crate::trace::take_transform_traces()
            .into_iter()
            .filter(|trace| trace.kind == crate::TransformKind::Ifftn && trace.shape == [7, 3])
            .collect::<Vec<_>>();
        assert!(!traces.is_empty());
        assert!(traces.iter().all(|trace| trace.mode.is_none()));
        assert_eq!(traces[0].backend, "rustfft");
    }
}
