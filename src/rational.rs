//! Rational approximation of real numbers for `RATIONAL` and `SRATIONAL` entries.

/// Largest denominator produced when a real number is stored as a rational.
pub const MAX_DENOMINATOR: u32 = 10_000_000;

/// Find the fraction closest to `x` with a denominator of at most `max_denominator`.
///
/// Walks the continued fraction expansion of `x` and finally compares the last convergent with
/// the best semiconvergent. Non-finite input maps to `0/1`. The numerator saturates at the `i64`
/// bounds, callers clamp it further to the width of their type.
pub fn approximate(x: f64, max_denominator: u32) -> (i64, u32) {
    if !x.is_finite() {
        return (0, 1);
    }

    let max_den = u128::from(max_denominator.max(1));
    let negative = x < 0.0;
    let target = x.abs();

    // Convergents p/q, previous one in (p0, q0).
    let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
    let mut rest = target;

    loop {
        let a = rest.floor();
        // `as` saturates, a huge partial quotient can never fit below `max_den` anyway.
        let a_int = a as u128;
        let q2 = q0.saturating_add(a_int.saturating_mul(q1));
        if q2 > max_den {
            break;
        }
        let p2 = p0.saturating_add(a_int.saturating_mul(p1));
        (p0, q0, p1, q1) = (p1, q1, p2, q2);

        let frac = rest - a;
        if frac <= f64::EPSILON * rest.max(1.0) {
            break;
        }
        rest = 1.0 / frac;
    }

    let (num, den) = if q1 == 0 {
        // Not even the integer part fits, only possible for max_den < 1 which is excluded above.
        (target.round() as u128, 1)
    } else {
        let k = (max_den - q0) / q1;
        let (bp, bq) = (p0 + k * p1, q0 + k * q1);
        let err_semi = (bp as f64 / bq as f64 - target).abs();
        let err_conv = (p1 as f64 / q1 as f64 - target).abs();
        if bq != 0 && err_semi < err_conv {
            (bp, bq)
        } else {
            (p1, q1)
        }
    };

    let num = i64::try_from(num).unwrap_or(i64::MAX);
    let num = if negative { -num } else { num };
    // The denominator is bounded by `max_denominator`.
    (num, den as u32)
}
