//! Construction plans: what can be built and the items in the queue.

use serde::{Deserialize, Serialize};

/// Kinds of structure the builders know how to raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
    /// Adds beds
    House,
    /// Adds crop yield
    Greenhouse,
    /// Adds technology and a school slot
    School,
}

impl BuildKind {
    pub fn label(&self) -> &'static str {
        match self {
            BuildKind::House => "House",
            BuildKind::Greenhouse => "Greenhouse",
            BuildKind::School => "School",
        }
    }
}

impl std::fmt::Display for BuildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A planned or in-progress construction. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Unique within one colony
    pub id: u64,
    pub kind: BuildKind,
    pub display_name: String,
    pub cost_points: f64,
    pub min_tech_level: f64,
}

impl Building {
    pub fn new(
        id: u64,
        kind: BuildKind,
        display_name: impl Into<String>,
        cost_points: f64,
        min_tech_level: f64,
    ) -> Self {
        Self {
            id,
            kind,
            display_name: display_name.into(),
            cost_points,
            min_tech_level,
        }
    }

    /// Whole in-game days of work once started (at least one).
    pub fn build_days(&self) -> u32 {
        // Truncation is intended: tier 2.5 takes two days.
        self.min_tech_level.max(1.0).min(f64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_days_floor_of_one() {
        let b = Building::new(1, BuildKind::House, "Hut", 10.0, 0.0);
        assert_eq!(b.build_days(), 1);
    }

    #[test]
    fn test_build_days_follows_tier() {
        let b = Building::new(2, BuildKind::Greenhouse, "Tower", 70.0, 3.0);
        assert_eq!(b.build_days(), 3);
        let b = Building::new(3, BuildKind::School, "Hall", 50.0, 2.5);
        assert_eq!(b.build_days(), 2);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&BuildKind::Greenhouse).unwrap();
        assert_eq!(json, "\"greenhouse\"");
    }
}
