// File: src/builtins.rs
//
// Numeric helpers shared by the machine and the native functions.
// These are plain functions with no access to machine state.

use rand::Rng;

/// Tolerance used by number equality and `<=`
pub const EPSILON: f64 = 0.005;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees / 180.0 * std::f64::consts::PI
}

/// Uniform float between the two bounds, in either order.
/// Equal or non-finite bounds return the lower bound itself.
pub fn random_between(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
        return lo;
    }
    let mut rng = rand::thread_rng();
    if (hi - lo).is_finite() {
        return rng.gen_range(lo..hi);
    }
    // The span overflows f64, so interpolate without forming it
    let t: f64 = rng.gen();
    (lo + t * hi - t * lo).max(lo).min(hi)
}
