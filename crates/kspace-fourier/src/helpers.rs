use ndarray::{ArrayD, Axis, Slice};

/// Integer mode indices of a centered length-`n` spectrum, as `f64`.
///
/// Runs from `-floor(n/2)` to `ceil(n/2) - 1`, i.e. the `fftshift` of the
/// unnormalized `fftfreq(n)` ordering. Index `n/2` holds the zero mode.
#[must_use]
pub fn centered_modes(n: usize) -> Vec<f64> {
    let half = (n / 2) as f64;
    (0..n).map(|idx| idx as f64 - half).collect()
}

/// Move the zero-frequency entry of `axis` to index `len / 2`.
///
/// Rotates left by `ceil(len / 2)`, matching numpy for odd lengths.
#[must_use]
pub fn fftshift_axis<T: Clone>(input: &ArrayD<T>, axis: usize) -> ArrayD<T> {
    let len = input.len_of(Axis(axis));
    rotate_left_axis(input, Axis(axis), len.div_ceil(2))
}

/// Inverse of [`fftshift_axis`]: rotates left by `floor(len / 2)`.
#[must_use]
pub fn ifftshift_axis<T: Clone>(input: &ArrayD<T>, axis: usize) -> ArrayD<T> {
    let len = input.len_of(Axis(axis));
    rotate_left_axis(input, Axis(axis), len / 2)
}

fn rotate_left_axis<T: Clone>(input: &ArrayD<T>, axis: Axis, shift: usize) -> ArrayD<T> {
    let len = input.len_of(axis);
    if len == 0 || shift % len == 0 {
        return input.clone();
    }
    let split = shift % len;
    let mut output = input.clone();
    output
        .slice_axis_mut(axis, Slice::from(..len - split))
        .assign(&input.slice_axis(axis, Slice::from(split..)));
    output
        .slice_axis_mut(axis, Slice::from(len - split..))
        .assign(&input.slice_axis(axis, Slice::from(..split)));
    output
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn, array};

    use super::{centered_modes, fftshift_axis, ifftshift_axis};

    #[test]
    fn centered_modes_even_and_odd() {
        assert_eq!(centered_modes(4), vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(centered_modes(5), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(centered_modes(1), vec![0.0]);
        assert!(centered_modes(0).is_empty());
    }

    #[test]
    fn fftshift_matches_numpy_for_odd_length() {
        let data = array![0, 1, 2, 3, 4].into_dyn();
        let shifted = fftshift_axis(&data, 0);
        assert_eq!(shifted, array![3, 4, 0, 1, 2].into_dyn());
        assert_eq!(ifftshift_axis(&shifted, 0), data);
    }

    #[test]
    fn fftshift_and_ifftshift_coincide_for_even_length() {
        let data = array![0, 1, 2, 3, 4, 5].into_dyn();
        assert_eq!(fftshift_axis(&data, 0), array![3, 4, 5, 0, 1, 2].into_dyn());
        assert_eq!(fftshift_axis(&data, 0), ifftshift_axis(&data, 0));
    }

    #[test]
    fn axis_shift_only_moves_requested_axis() {
        let grid = array![[1, 2, 3], [4, 5, 6]].into_dyn();
        let rows = fftshift_axis(&grid, 0);
        assert_eq!(rows, array![[4, 5, 6], [1, 2, 3]].into_dyn());
        let cols = fftshift_axis(&grid, 1);
        assert_eq!(cols, array![[3, 1, 2], [6, 4, 5]].into_dyn());
        assert_eq!(ifftshift_axis(&cols, 1), grid);
    }

    #[test]
    fn axis_shift_tolerates_empty_axes() {
        let empty = ArrayD::<i32>::zeros(IxDyn(&[0, 3]));
        assert_eq!(fftshift_axis(&empty, 0).shape(), &[0, 3]);
    }
}
