use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::id::{ComparisonId, Side};

/// Location of one staged payload in the staging area.
///
/// Locations are never shared between records: every freshly staged payload
/// gets a new unique file name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartLocation(PathBuf);

impl PartLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// `file://` URI for the location, as reported back to submitters.
    pub fn to_uri(&self) -> String {
        let path = self.0.to_string_lossy().replace('\\', "/");
        if path.starts_with('/') {
            format!("file://{path}")
        } else {
            format!("file:///{path}")
        }
    }
}

impl fmt::Debug for PartLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartLocation({})", self.0.display())
    }
}

impl fmt::Display for PartLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for PartLocation {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// State of one side of a comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "location", rename_all = "lowercase")]
pub enum PartSlot {
    /// Nothing has been submitted for this side yet.
    #[default]
    Absent,
    /// A payload has been staged at this location.
    Staged(PartLocation),
}

impl PartSlot {
    pub fn is_staged(&self) -> bool {
        matches!(self, PartSlot::Staged(_))
    }

    pub fn location(&self) -> Option<&PartLocation> {
        match self {
            PartSlot::Absent => None,
            PartSlot::Staged(location) => Some(location),
        }
    }
}

/// The two staged halves of one comparison.
///
/// A record only references payload files; it never holds payload bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: ComparisonId,
    pub left: PartSlot,
    pub right: PartSlot,
}

impl ComparisonRecord {
    /// A record with neither side submitted.
    pub fn new(id: ComparisonId) -> Self {
        Self {
            id,
            left: PartSlot::Absent,
            right: PartSlot::Absent,
        }
    }

    pub fn slot(&self, side: Side) -> &PartSlot {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut PartSlot {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Stage `location` on `side`, returning the slot it replaced.
    pub fn stage(&mut self, side: Side, location: PartLocation) -> PartSlot {
        std::mem::replace(self.slot_mut(side), PartSlot::Staged(location))
    }

    /// Both staged locations in `(left, right)` order, or the first side
    /// that has not been submitted yet.
    pub fn staged_pair(&self) -> Result<(&PartLocation, &PartLocation), Side> {
        match (&self.left, &self.right) {
            (PartSlot::Staged(left), PartSlot::Staged(right)) => Ok((left, right)),
            (PartSlot::Absent, _) => Err(Side::Left),
            (_, PartSlot::Absent) => Err(Side::Right),
        }
    }

    /// Every staged location with the side it belongs to.
    pub fn staged(&self) -> impl Iterator<Item = (Side, &PartLocation)> {
        Side::BOTH
            .into_iter()
            .filter_map(move |side| self.slot(side).location().map(|loc| (side, loc)))
    }

    /// Returns `true` if any slot of this record points at `location`.
    pub fn references(&self, location: &PartLocation) -> bool {
        self.staged().any(|(_, staged)| staged == location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str) -> PartLocation {
        PartLocation::new(format!("/tmp/staging/{name}"))
    }

    #[test]
    fn new_record_is_empty() {
        let record = ComparisonRecord::new(ComparisonId::new(1));
        assert_eq!(record.left, PartSlot::Absent);
        assert_eq!(record.right, PartSlot::Absent);
        assert_eq!(record.staged_pair(), Err(Side::Left));
        assert_eq!(record.staged().count(), 0);
    }

    #[test]
    fn stage_returns_previous_slot() {
        let mut record = ComparisonRecord::new(ComparisonId::new(1));
        let previous = record.stage(Side::Right, loc("a"));
        assert_eq!(previous, PartSlot::Absent);

        let previous = record.stage(Side::Right, loc("b"));
        assert_eq!(previous, PartSlot::Staged(loc("a")));
        assert_eq!(record.right.location(), Some(&loc("b")));
        assert_eq!(record.staged_pair(), Err(Side::Left));
    }

    #[test]
    fn staged_pair_requires_both() {
        let mut record = ComparisonRecord::new(ComparisonId::new(3));
        record.stage(Side::Left, loc("l"));
        assert_eq!(record.staged_pair(), Err(Side::Right));

        record.stage(Side::Right, loc("r"));
        let (left, right) = record.staged_pair().unwrap();
        assert_eq!(left, &loc("l"));
        assert_eq!(right, &loc("r"));
    }

    #[test]
    fn staged_lists_sides_in_order() {
        let mut record = ComparisonRecord::new(ComparisonId::new(4));
        record.stage(Side::Right, loc("r"));
        record.stage(Side::Left, loc("l"));
        let sides: Vec<Side> = record.staged().map(|(side, _)| side).collect();
        assert_eq!(sides, vec![Side::Left, Side::Right]);
        assert!(record.references(&loc("r")));
        assert!(!record.references(&loc("x")));
    }

    #[test]
    fn location_uri() {
        assert_eq!(loc("abc").to_uri(), "file:///tmp/staging/abc");
        assert_eq!(
            PartLocation::new("C:\\Temp\\x").to_uri(),
            "file:///C:/Temp/x"
        );
    }

    #[test]
    fn slot_serde_shape() {
        let json = serde_json::to_value(PartSlot::Staged(loc("a"))).unwrap();
        assert_eq!(json["state"], "staged");
        assert_eq!(json["location"], "/tmp/staging/a");
        let absent = serde_json::to_value(PartSlot::Absent).unwrap();
        assert_eq!(absent["state"], "absent");
    }
}
