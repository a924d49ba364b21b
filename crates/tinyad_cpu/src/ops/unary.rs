use rayon::prelude::*;

macro_rules! unary_op {
    ($name:ident, $type:ty, $x:ident, $body:expr) => {
        /// # Safety
        ///
        /// Caller must guarantee that `input` and `out` are valid pointers to at least
        /// `num_els` elements and that they do not overlap.
        pub unsafe fn $name(num_els: usize, input: *const $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, num_els);
            let out = std::slice::from_raw_parts_mut(out, num_els);

            out.par_iter_mut().zip(input.par_iter()).for_each(|(out_val, &$x)| {
                *out_val = $body;
            });
        }
    };
}

macro_rules! unary_op_with_param {
    ($name:ident, $type:ty, $x:ident, $p:ident, $body:expr) => {
        /// # Safety
        ///
        /// Caller must guarantee that `input` and `out` are valid pointers to at least
        /// `num_els` elements and that they do not overlap.
        pub unsafe fn $name(num_els: usize, input: *const $type, $p: $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, num_els);
            let out = std::slice::from_raw_parts_mut(out, num_els);

            out.par_iter_mut().zip(input.par_iter()).for_each(|(out_val, &$x)| {
                *out_val = $body;
            });
        }
    };
}

macro_rules! declare_unary_op {
    ($name:ident, $x:ident, $body:expr) => {
        paste::paste! {
            unary_op!([<$name _f32>], f32, $x, $body);
            unary_op!([<$name _f64>], f64, $x, $body);
        }
    };
    ($name:ident, $x:ident, $p:ident, $body:expr) => {
        paste::paste! {
            unary_op_with_param!([<$name _f32>], f32, $x, $p, $body);
            unary_op_with_param!([<$name _f64>], f64, $x, $p, $body);
        }
    };
}

declare_unary_op!(neg, x, -x);
declare_unary_op!(exp, x, x.exp());
declare_unary_op!(log, x, x.ln());
declare_unary_op!(relu, x, if x > 0.0 { x } else { 0.0 });
declare_unary_op!(sigmoid, x, 1.0 / (1.0 + (-x).exp()));
declare_unary_op!(leaky_relu, x, slope, if x > 0.0 { x } else { slope * x });

macro_rules! fill_op {
    ($name:ident, $type:ty) => {
        /// # Safety
        ///
        /// Caller must guarantee that `out` is a valid pointer to at least `num_els` elements.
        pub unsafe fn $name(num_els: usize, value: $type, out: *mut $type) {
            let out = std::slice::from_raw_parts_mut(out, num_els);
            out.par_iter_mut().for_each(|out_val| *out_val = value);
        }
    };
}

fill_op!(fill_f32, f32);
fill_op!(fill_f64, f64);

macro_rules! leaky_relu_backward_op {
    ($name:ident, $type:ty) => {
        /// # Safety
        ///
        /// Caller must guarantee that `input`, `grad` and `out` are valid pointers to at
        /// least `num_els` elements and that `out` overlaps neither input.
        pub unsafe fn $name(num_els: usize, input: *const $type, grad: *const $type, slope: $type, out: *mut $type) {
            let input = std::slice::from_raw_parts(input, num_els);
            let grad = std::slice::from_raw_parts(grad, num_els);
            let out = std::slice::from_raw_parts_mut(out, num_els);

            out.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                *out_val = if input[i] > 0.0 { grad[i] } else { slope * grad[i] };
            });
        }
    };
}

leaky_relu_backward_op!(leaky_relu_backward_f32, f32);
leaky_relu_backward_op!(leaky_relu_backward_f64, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_and_leaky_relu() {
        let input = [-2.0f32, 0.0, 3.0];
        let mut out = [0.0f32; 3];

        unsafe { relu_f32(3, input.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, [0.0, 0.0, 3.0]);

        unsafe { leaky_relu_f32(3, input.as_ptr(), 0.5, out.as_mut_ptr()) };
        assert_eq!(out, [-1.0, 0.0, 3.0]);
    }

    #[test]
    fn fill() {
        let mut out = [0.0f64; 4];
        unsafe { fill_f64(4, 2.5, out.as_mut_ptr()) };
        assert_eq!(out, [2.5; 4]);
    }
}
