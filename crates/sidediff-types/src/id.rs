use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by both parties of a comparison.
///
/// Both submitters tag their payload with the same `ComparisonId`; the store
/// keys its records by it. Rendered as a plain decimal number and
/// deserialized from one, so it can travel as a URL path segment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonId(u64);

impl ComparisonId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ComparisonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparisonId({})", self.0)
    }
}

impl fmt::Display for ComparisonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One half of a comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn id_display_is_decimal() {
        let id = ComparisonId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "ComparisonId(42)");
    }

    #[test]
    fn id_serializes_as_number() {
        let json = serde_json::to_string(&ComparisonId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn side_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        let side: Side = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(side, Side::Right);
        assert!(serde_json::from_str::<Side>("\"middle\"").is_err());
    }

    #[test]
    fn id_rejects_non_numeric_json() {
        assert!(serde_json::from_str::<ComparisonId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<ComparisonId>("-1").is_err());
    }

    proptest! {
        #[test]
        fn id_display_matches_json(n in any::<u64>()) {
            let id = ComparisonId::new(n);
            prop_assert_eq!(id.to_string(), serde_json::to_string(&id).unwrap());
            prop_assert_eq!(serde_json::from_str::<ComparisonId>(&id.to_string()).unwrap(), id);
        }
    }
}
