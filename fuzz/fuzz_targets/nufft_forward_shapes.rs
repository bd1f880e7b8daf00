#![no_main]

use arbitrary::Arbitrary;
use kspace_fourier::{FourierError, nonuniform_fourier_transform_forward};
use libfuzzer_sys::fuzz_target;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

#[derive(Debug, Arbitrary)]
struct ForwardInput {
    k_shape: Vec<u8>,
    x_shape: Vec<u8>,
    k_values: Vec<f64>,
    eps: f64,
}

fn bounded_shape(raw: &[u8]) -> Vec<usize> {
    raw.iter().take(6).map(|&len| usize::from(len % 5)).collect()
}

fuzz_target!(|input: ForwardInput| {
    let k_shape = bounded_shape(&input.k_shape);
    let x_shape = bounded_shape(&input.x_shape);
    let k_len = k_shape.iter().product::<usize>();
    let x_len = x_shape.iter().product::<usize>();
    if k_len > 512 || x_len > 512 {
        return;
    }
    let mut k_values = input.k_values;
    k_values.resize(k_len, 0.0);
    let Ok(k) = ArrayD::from_shape_vec(IxDyn(&k_shape), k_values) else {
        return;
    };
    let x = ArrayD::from_elem(IxDyn(&x_shape), Complex64::new(1.0, -1.0));

    match nonuniform_fourier_transform_forward(&k, &x, input.eps) {
        Ok(samples) => {
            assert!(k.iter().all(|v| !(v.abs() > 0.5)));
            assert_eq!(samples.shape()[0], x_shape[0]);
            assert_eq!(samples.shape()[1], k_shape[1]);
        }
        Err(FourierError::Domain { value, .. }) => assert!(value.abs() > 0.5),
        Err(_) => {}
    }
});
