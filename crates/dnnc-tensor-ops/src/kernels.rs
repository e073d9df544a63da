//! Scalar kernels applied to every element by the unary operators.

use num_traits::Float;

/// Sign of `x`: `1` if positive, `-1` if negative, `0` for both zeros.
///
/// The comparison against zero is exact. NaN is returned unchanged.
///
/// # Example
///
/// ```
/// use dnnc_tensor_ops::kernels::sign;
///
/// assert_eq!(sign(-2.0f32), -1.0);
/// assert_eq!(sign(-0.0f32), 0.0);
/// assert_eq!(sign(3.5f32), 1.0);
/// assert_eq!(sign(1e-30f32), 1.0);
/// ```
#[inline]
pub fn sign<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        -T::one()
    } else if x == T::zero() {
        T::zero()
    } else {
        x
    }
}

/// Clamps `v` to `[lo, hi]`, i.e. `max(lo, min(hi, v))`.
///
/// Unlike `f32::clamp` this never panics on `lo > hi` and lets NaN through.
#[inline]
pub fn clip<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Hard sigmoid of `x`: `clip(alpha * x + beta, 0, 1)`.
///
/// # Example
///
/// ```
/// use dnnc_tensor_ops::kernels::hardsigmoid;
///
/// assert_eq!(hardsigmoid(0.0f32, 0.2, 0.4), 0.4);
/// assert_eq!(hardsigmoid(10.0f32, 0.2, 0.4), 1.0);
/// assert_eq!(hardsigmoid(-10.0f32, 0.2, 0.4), 0.0);
/// ```
#[inline]
pub fn hardsigmoid<T: Float>(x: T, alpha: T, beta: T) -> T {
    clip(alpha * x + beta, T::zero(), T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sign_values() {
        assert_eq!(sign(-2.0f32), -1.0);
        assert_eq!(sign(0.0f32), 0.0);
        assert_eq!(sign(3.5f32), 1.0);
        assert_eq!(sign(f32::MIN_POSITIVE), 1.0);
        assert_eq!(sign(-f32::MIN_POSITIVE), -1.0);
        assert_eq!(sign(f32::INFINITY), 1.0);
        assert_eq!(sign(f32::NEG_INFINITY), -1.0);
        assert_eq!(sign(-3.0f64), -1.0);
    }

    #[test]
    fn test_sign_zero_is_fixed_point() {
        assert_eq!(sign(0.0f32).to_bits(), 0.0f32.to_bits());
        assert_eq!(sign(-0.0f32).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn test_sign_nan() {
        assert!(sign(f32::NAN).is_nan());
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip(0.5, 0.0, 1.0), 0.5);
        assert_eq!(clip(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clip(1.5, 0.0, 1.0), 1.0);
        assert!(clip(f32::NAN, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_hardsigmoid_linear_region() {
        assert_relative_eq!(hardsigmoid(1.0f32, 0.2, 0.4), 0.6, epsilon = 1e-6);
        assert_relative_eq!(hardsigmoid(-1.0f32, 0.2, 0.4), 0.2, epsilon = 1e-6);
        assert_relative_eq!(hardsigmoid(0.3f32, 0.11, 0.22), 0.253, epsilon = 1e-6);
    }

    #[test]
    fn test_hardsigmoid_saturates() {
        assert_eq!(hardsigmoid(3.0f32, 0.2, 0.4), 1.0);
        assert_eq!(hardsigmoid(-2.0f32, 0.2, 0.4), 0.0);
        // beta alone already above one
        assert_eq!(hardsigmoid(-0.1f32, 0.8, 1.6), 1.0);
    }

    #[test]
    fn test_hardsigmoid_degenerate_params() {
        assert_eq!(hardsigmoid(123.0f32, 0.0, 0.5), 0.5);
        assert_eq!(hardsigmoid(2.0f32, -1.0, 0.0), 0.0);
        assert_eq!(hardsigmoid(-2.0f32, -1.0, 0.0), 1.0);
    }
}
