//! Axis travel limit configuration.

use serde::Deserialize;

use super::units::Millimeters;

/// Policy for handling targets beyond the axis travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject moves that would exceed the travel.
    #[default]
    Reject,
    /// Clamp target to the end of travel.
    Clamp,
}

/// Usable travel of one axis, measured from the home switch at 0 mm.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TravelLimits {
    /// Far end of travel in millimeters.
    #[serde(rename = "max_mm")]
    pub max: Millimeters,

    /// What to do when the travel is exceeded.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl TravelLimits {
    /// Create new travel limits.
    pub fn new(max: Millimeters, policy: LimitPolicy) -> Self {
        Self { max, policy }
    }

    /// Check if a position is within travel.
    pub fn contains(&self, position: Millimeters) -> bool {
        position <= self.max
    }

    /// Apply limit policy to a target position.
    ///
    /// Returns `Some(position)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: Millimeters) -> Option<Millimeters> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => Some(self.max),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_reject() {
        let limits = TravelLimits::new(Millimeters(400), LimitPolicy::Reject);

        assert!(limits.apply(Millimeters(0)).is_some());
        assert!(limits.apply(Millimeters(400)).is_some());
        assert!(limits.apply(Millimeters(401)).is_none());
    }

    #[test]
    fn test_travel_clamp() {
        let limits = TravelLimits::new(Millimeters(400), LimitPolicy::Clamp);

        assert_eq!(limits.apply(Millimeters(120)), Some(Millimeters(120)));
        assert_eq!(limits.apply(Millimeters(900)), Some(Millimeters(400)));
    }
}
