use rayon::prelude::*;

macro_rules! binary_op {
    ($name:ident, $type:ty, $x:ident, $y:ident, $body:expr) => {
        /// # Safety
        ///
        /// Caller must guarantee that:
        /// * `lhs`, `rhs` and `out` are valid pointers to at least `num_els` elements
        /// * `out` does not overlap `lhs` or `rhs`
        /// * the alignment requirements of the element type are respected
        pub unsafe fn $name(num_els: usize, lhs: *const $type, rhs: *const $type, out: *mut $type) {
            let lhs = std::slice::from_raw_parts(lhs, num_els);
            let rhs = std::slice::from_raw_parts(rhs, num_els);
            let out = std::slice::from_raw_parts_mut(out, num_els);

            out.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                let $x: $type = lhs[i];
                let $y: $type = rhs[i];
                *out_val = $body;
            });
        }
    };
}

macro_rules! ternary_op {
    ($name:ident, $type:ty, $x:ident, $y:ident, $g:ident, $body:expr) => {
        /// # Safety
        ///
        /// Caller must guarantee that:
        /// * `lhs`, `rhs`, `grad` and `out` are valid pointers to at least `num_els` elements
        /// * `out` does not overlap any input
        pub unsafe fn $name(num_els: usize, lhs: *const $type, rhs: *const $type, grad: *const $type, out: *mut $type) {
            let lhs = std::slice::from_raw_parts(lhs, num_els);
            let rhs = std::slice::from_raw_parts(rhs, num_els);
            let grad = std::slice::from_raw_parts(grad, num_els);
            let out = std::slice::from_raw_parts_mut(out, num_els);

            out.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                let $x: $type = lhs[i];
                let $y: $type = rhs[i];
                let $g: $type = grad[i];
                *out_val = $body;
            });
        }
    };
}

macro_rules! declare_binary_op {
    ($name:ident, $x:ident, $y:ident, $body:expr) => {
        paste::paste! {
            binary_op!([<$name _f32>], f32, $x, $y, $body);
            binary_op!([<$name _f64>], f64, $x, $y, $body);
        }
    };
}

macro_rules! declare_ternary_op {
    ($name:ident, $x:ident, $y:ident, $g:ident, $body:expr) => {
        paste::paste! {
            ternary_op!([<$name _f32>], f32, $x, $y, $g, $body);
            ternary_op!([<$name _f64>], f64, $x, $y, $g, $body);
        }
    };
}

declare_binary_op!(add, x, y, x + y);
declare_binary_op!(sub, x, y, x - y);
declare_binary_op!(mul, x, y, x * y);
declare_binary_op!(div, x, y, x / y);
declare_binary_op!(pow, x, y, x.powf(y));

// gradient helpers: `lhs` is the saved forward input, `rhs` the upstream gradient
declare_binary_op!(relu_backward, x, g, if x > 0.0 { g } else { 0.0 });
declare_binary_op!(sigmoid_backward, s, g, g * s * (1.0 - s));

// d(x^y)/dx and d(x^y)/dy
declare_ternary_op!(pow_backward_lhs, x, y, g, g * y * x.powf(y - 1.0));
declare_ternary_op!(pow_backward_rhs, x, y, g, g * x.ln() * x.powf(y));
