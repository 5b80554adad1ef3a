/*
 * Vector Module
 *
 * Positions, velocities and force deltas are glam's Vec2. This module adds
 * the few helpers the force pass relies on:
 * - Clamping a vector to a maximum magnitude
 * - Squared distances (no square root in the neighbor loop)
 * - Averaging a list of vectors
 *
 * Magnitudes are computed with hypot so very large deltas (an agent right
 * on a wall) still clamp to the limit instead of overflowing to zero.
 */

pub type Vector2 = glam::Vec2;

// Smallest magnitude we are willing to divide by
pub const MAGNITUDE_FLOOR: f32 = 1e-6;

// Euclidean norm, finite for every finite vector
#[inline]
pub fn magnitude(vec: Vector2) -> f32 {
    vec.x.hypot(vec.y)
}

// Return `vec` unchanged if it is no longer than `max_magnitude`, otherwise
// rescale it to exactly `max_magnitude`.
#[inline]
pub fn clamp(vec: Vector2, max_magnitude: f32) -> Vector2 {
    // NaN or negative limits cannot be satisfied by anything but zero
    if max_magnitude.is_nan() || max_magnitude < 0.0 {
        return Vector2::ZERO;
    }

    let magnitude = magnitude(vec);
    if magnitude > max_magnitude {
        vec * (max_magnitude / magnitude.max(MAGNITUDE_FLOOR))
    } else {
        vec
    }
}

#[inline]
pub fn distance_squared(a: Vector2, b: Vector2) -> f32 {
    a.distance_squared(b)
}

// Arithmetic mean, zero for an empty slice
pub fn average(vecs: &[Vector2]) -> Vector2 {
    if vecs.is_empty() {
        return Vector2::ZERO;
    }

    vecs.iter().sum::<Vector2>() / vecs.len() as f32
}
