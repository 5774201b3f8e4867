//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Get the signed shortest angular difference `a - b`, wrapped into
/// `[-pi, pi]`.
///
/// The result is positive when `a` leads `b`, i.e. when the shortest rotation
/// taking `b` onto `a` is anticlockwise. Both inputs may be outside
/// `[-pi, pi]`, wrapping is handled via euclidean remainders.
pub fn ang_shortest_diff<T>(a: T, b: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let c = rem_euclid(a - b, tau_t);

    if c > pi_t {
        c - tau_t
    } else {
        c
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Generalised logistic function.
///
/// Computes `amplitude / (1 + exp(-steepness * (value - midpoint))) + offset`.
///
/// The output is bounded to `(offset, offset + amplitude)`, is continuous,
/// and is monotonically increasing in `value` for positive `steepness`. With
/// `midpoint = 0` and `offset = -amplitude / 2` the output is zero at zero
/// and its sign matches the sign of `value`.
pub fn logistic<T>(value: T, midpoint: T, amplitude: T, steepness: T, offset: T) -> T
where
    T: Float,
{
    amplitude / (T::from(1.0).unwrap() + (-steepness * (value - midpoint)).exp()) + offset
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_ang_shortest_diff() {
        assert_relative_eq!(ang_shortest_diff(2f64, 1f64), 1f64);
        assert_relative_eq!(ang_shortest_diff(1f64, 2f64), -1f64);
        assert_relative_eq!(ang_shortest_diff(TAU, 0f64), 0f64);
        assert_relative_eq!(ang_shortest_diff(0f64, TAU), 0f64);

        // Wrapping across the +-pi boundary must take the short way round
        assert_relative_eq!(
            ang_shortest_diff(PI - 0.1, -PI + 0.1),
            -0.2,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            ang_shortest_diff(-PI + 0.1, PI - 0.1),
            0.2,
            epsilon = 1e-9
        );

        // Inputs outside [-pi, pi] are accepted
        assert_relative_eq!(ang_shortest_diff(3.0 * TAU + 1.0, 0f64), 1f64, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5f64, -1.0, 1.0), 0.5);
        assert_eq!(clamp(2.0f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0f64, -1.0, 1.0), -1.0);
    }

    #[test]
    fn test_lin_map() {
        assert_relative_eq!(lin_map((-1f64, 1f64), (-50f64, 50f64), 0.5), 25.0);
        assert_relative_eq!(lin_map((0f64, 1f64), (0f64, 10f64), 0.2), 2.0);
    }

    #[test]
    fn test_logistic_contract() {
        // Default heading-blend shape: zero at zero, odd sign, bounded
        let blend = |x: f64| logistic(x, 0.0, 2.0, 2.0, -1.0);

        assert_relative_eq!(blend(0.0), 0.0);
        assert!(blend(0.5) > 0.0);
        assert!(blend(-0.5) < 0.0);

        // Bounded by (offset, offset + amplitude)
        assert!(blend(1e6) <= 1.0);
        assert!(blend(-1e6) >= -1.0);

        // Monotonically increasing
        let mut prev = blend(-10.0);
        let mut x = -10.0;
        while x <= 10.0 {
            let y = blend(x);
            assert!(y >= prev - 1e-12);
            prev = y;
            x += 0.1;
        }
    }
}
