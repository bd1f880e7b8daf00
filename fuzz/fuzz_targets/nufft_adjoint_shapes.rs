#![no_main]

use arbitrary::Arbitrary;
use kspace_fourier::{FourierError, NufftAdapter, NufftOptions, ShapeError};
use kspace_runtime::RuntimeMode;
use libfuzzer_sys::fuzz_target;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

#[derive(Debug, Arbitrary)]
struct AdjointInput {
    k_shape: Vec<u8>,
    x_shape: Vec<u8>,
    n_modes: Vec<u8>,
    x_values: Vec<(f64, f64)>,
    hardened: bool,
    nthreads: u8,
}

fn bounded_shape(raw: &[u8]) -> Vec<usize> {
    raw.iter().take(5).map(|&len| usize::from(len % 5)).collect()
}

fuzz_target!(|input: AdjointInput| {
    let k_shape = bounded_shape(&input.k_shape);
    let x_shape = bounded_shape(&input.x_shape);
    let n_modes = bounded_shape(&input.n_modes);
    if k_shape.iter().product::<usize>() > 256
        || x_shape.iter().product::<usize>() > 256
        || n_modes.iter().product::<usize>() > 256
    {
        return;
    }
    let k = ArrayD::from_elem(IxDyn(&k_shape), 0.125);
    let mut values = input.x_values;
    values.resize(x_shape.iter().product(), (0.0, 0.0));
    let values = values
        .into_iter()
        .map(|(re, im)| Complex64::new(re, im))
        .collect();
    let Ok(x) = ArrayD::from_shape_vec(IxDyn(&x_shape), values) else {
        return;
    };

    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let options = NufftOptions::default()
        .with_mode(mode)
        .with_nthreads(usize::from(input.nthreads % 4));
    let adapter: NufftAdapter = NufftAdapter::default();

    match adapter.adjoint(&k, &x, &n_modes, &options) {
        Ok(image) => {
            assert!(image.ndim() >= 4);
            let spatial: usize = image.shape()[1..4].iter().product();
            assert_eq!(spatial, n_modes.iter().product::<usize>());
        }
        Err(FourierError::Shape(ShapeError::EmptyMode { axis })) => {
            assert_eq!(n_modes[axis], 0);
        }
        Err(_) => {}
    }
});
