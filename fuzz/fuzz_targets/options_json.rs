#![no_main]

use kspace_fourier::NufftOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(options) = serde_json::from_slice::<NufftOptions>(data) else {
        return;
    };
    if options.validate().is_ok() {
        assert!(options.eps.is_finite() && options.eps > 0.0);
        assert!(options.nthreads > 0);
    }
});
