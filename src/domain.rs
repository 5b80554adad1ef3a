/*
 * Domain Module
 *
 * The simulation lives in a fixed square region [0, span) x [0, span).
 * The spatial grid is laid over it and the integration pass keeps every
 * agent inside it. Anything that leaves is returned to the rescue point.
 */

use crate::error::SwarmError;
use crate::vector::Vector2;

// Side length used when nothing else is configured
pub const DEFAULT_SPAN: f32 = 256.0;

// Velocity given to an agent after it has been rescued
pub const RESCUE_VELOCITY: Vector2 = Vector2::ZERO;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    span: f32,
}

impl Domain {
    pub fn new(span: f32) -> Result<Self, SwarmError> {
        if !span.is_finite() || span <= 0.0 {
            return Err(SwarmError::InvalidConfig("domain span must be finite and positive"));
        }
        Ok(Self { span })
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.span
    }

    // Half-open containment test; NaN coordinates are never inside
    #[inline]
    pub fn contains(&self, pos: Vector2) -> bool {
        (0.0..self.span).contains(&pos.x) && (0.0..self.span).contains(&pos.y)
    }

    #[inline]
    pub fn rescue_point(&self) -> Vector2 {
        Vector2::new(self.span * 0.5, self.span * 0.5)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self { span: DEFAULT_SPAN }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let domain = Domain::new(10.0).unwrap();
        assert!(domain.contains(Vector2::new(0.0, 0.0)));
        assert!(domain.contains(Vector2::new(9.999, 5.0)));
        assert!(!domain.contains(Vector2::new(10.0, 5.0)));
        assert!(!domain.contains(Vector2::new(5.0, -0.001)));
        assert!(!domain.contains(Vector2::new(f32::NAN, 5.0)));
    }

    #[test]
    fn rescue_point_is_inside() {
        let domain = Domain::default();
        assert!(domain.contains(domain.rescue_point()));
        assert_eq!(domain.rescue_point(), Vector2::new(128.0, 128.0));
    }

    #[test]
    fn rejects_degenerate_spans() {
        assert!(Domain::new(0.0).is_err());
        assert!(Domain::new(-3.0).is_err());
        assert!(Domain::new(f32::INFINITY).is_err());
        assert!(Domain::new(f32::NAN).is_err());
    }
}
