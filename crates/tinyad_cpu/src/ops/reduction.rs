use rayon::prelude::*;

macro_rules! sum_op {
    ($name:ident, $type:ty) => {
        /// # Safety
        ///
        /// Caller must guarantee that `input` points to at least `num_els` elements and
        /// `out` points to one writable element.
        pub unsafe fn $name(num_els: usize, input: *const $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, num_els);
            *out = input.par_iter().copied().sum::<$type>();
        }
    };
}

sum_op!(sum_f32, f32);
sum_op!(sum_f64, f64);

macro_rules! log_softmax_op {
    ($name:ident, $type:ty) => {
        /// Row-wise log-softmax over a `rows x cols` contiguous matrix.
        ///
        /// # Safety
        ///
        /// Caller must guarantee that `input` and `out` point to `rows * cols` elements
        /// and do not overlap.
        pub unsafe fn $name(rows: usize, cols: usize, input: *const $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, rows * cols);
            let out = std::slice::from_raw_parts_mut(out, rows * cols);

            out.par_chunks_mut(cols).zip(input.par_chunks(cols)).for_each(|(out_row, in_row)| {
                let max = in_row.iter().copied().fold(<$type>::NEG_INFINITY, <$type>::max);
                let log_sum = in_row.iter().map(|&x| (x - max).exp()).sum::<$type>().ln() + max;
                for (o, &x) in out_row.iter_mut().zip(in_row.iter()) {
                    *o = x - log_sum;
                }
            });
        }
    };
}

log_softmax_op!(log_softmax_f32, f32);
log_softmax_op!(log_softmax_f64, f64);

macro_rules! log_softmax_backward_op {
    ($name:ident, $type:ty) => {
        /// `out` is the forward log-softmax result, `grad` the upstream gradient.
        ///
        /// # Safety
        ///
        /// Caller must guarantee that `output`, `grad` and `out` point to `rows * cols`
        /// elements and that `out` overlaps neither input.
        pub unsafe fn $name(rows: usize, cols: usize, output: *const $type, grad: *const $type, out: *mut $type) {
            let output = std::slice::from_raw_parts(output, rows * cols);
            let grad = std::slice::from_raw_parts(grad, rows * cols);
            let out = std::slice::from_raw_parts_mut(out, rows * cols);

            out.par_chunks_mut(cols)
                .zip(output.par_chunks(cols).zip(grad.par_chunks(cols)))
                .for_each(|(out_row, (y_row, g_row))| {
                    let g_sum = g_row.iter().copied().sum::<$type>();
                    for ((o, &y), &g) in out_row.iter_mut().zip(y_row.iter()).zip(g_row.iter()) {
                        *o = g - y.exp() * g_sum;
                    }
                });
        }
    };
}

log_softmax_backward_op!(log_softmax_backward_f32, f32);
log_softmax_backward_op!(log_softmax_backward_f64, f64);
