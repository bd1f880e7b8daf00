#![no_main]

use arbitrary::Arbitrary;
use kspace_fourier::{FourierError, fourier_transform_adjoint, fourier_transform_forward};
use libfuzzer_sys::fuzz_target;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

#[derive(Debug, Arbitrary)]
struct UniformInput {
    shape: Vec<u8>,
    axes: Vec<u8>,
    seed: f64,
}

fuzz_target!(|input: UniformInput| {
    let shape: Vec<usize> = input.shape.iter().take(4).map(|&len| usize::from(len % 9)).collect();
    if shape.iter().product::<usize>() > 4096 {
        return;
    }
    let axes: Vec<usize> = input.axes.iter().take(6).map(|&axis| usize::from(axis % 6)).collect();
    let seed = if input.seed.is_finite() { input.seed % 100.0 } else { 0.0 };
    let mut counter = seed;
    let x = ArrayD::from_shape_simple_fn(IxDyn(&shape), || {
        counter += 1.0;
        Complex64::new(counter.sin(), counter.cos())
    });

    match fourier_transform_forward(&x, &axes) {
        Ok(spectrum) => {
            assert_eq!(spectrum.shape(), x.shape());
            let recovered = fourier_transform_adjoint(&spectrum, &axes).expect("same axes");
            for (a, b) in recovered.iter().zip(x.iter()) {
                assert!((a - b).norm() < 1e-8);
            }
        }
        Err(FourierError::InvalidAxis { axis, ndim }) => assert!(axis >= ndim),
        Err(FourierError::DuplicateAxis { .. }) => {}
        Err(other) => panic!("unexpected error {other}"),
    }
});
