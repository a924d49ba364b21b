use rayon::prelude::*;

macro_rules! matmul_op {
    ($name:ident, $type:ty) => {
        /// Computes `out[m x n] = lhs[m x k] * rhs[k x n]` for contiguous row-major matrices.
        ///
        /// # Safety
        ///
        /// Caller must guarantee that `lhs` holds `m * k`, `rhs` holds `k * n` and `out`
        /// holds `m * n` elements, and that `out` overlaps neither input.
        pub unsafe fn $name(m: usize, k: usize, n: usize, lhs: *const $type, rhs: *const $type, out: *mut $type) {
            let lhs = std::slice::from_raw_parts(lhs, m * k);
            let rhs = std::slice::from_raw_parts(rhs, k * n);
            let out = std::slice::from_raw_parts_mut(out, m * n);

            out.par_chunks_mut(n.max(1)).enumerate().for_each(|(row, out_row)| {
                for (col, out_val) in out_row.iter_mut().enumerate() {
                    let mut acc: $type = 0.0;
                    for p in 0..k {
                        acc += lhs[row * k + p] * rhs[p * n + col];
                    }
                    *out_val = acc;
                }
            });
        }
    };
}

matmul_op!(matmul_f32, f32);
matmul_op!(matmul_f64, f64);

macro_rules! transpose_op {
    ($name:ident, $type:ty) => {
        /// Writes the transpose of a `rows x cols` matrix into `out` (`cols x rows`).
        ///
        /// # Safety
        ///
        /// Caller must guarantee that `input` and `out` hold `rows * cols` elements and
        /// do not overlap.
        pub unsafe fn $name(rows: usize, cols: usize, input: *const $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, rows * cols);
            let out = std::slice::from_raw_parts_mut(out, rows * cols);

            out.par_chunks_mut(rows.max(1)).enumerate().for_each(|(col, out_row)| {
                for (row, out_val) in out_row.iter_mut().enumerate() {
                    *out_val = input[row * cols + col];
                }
            });
        }
    };
}

transpose_op!(transpose_f32, f32);
transpose_op!(transpose_f64, f64);
