use core::fmt;
use uuid::Uuid;

/// Identifier stamped on an equipment instance by each `run()`.
///
/// A flow-sheet driver passes the same id to every unit it runs in one sweep,
/// so results can be traced back to the calculation that produced them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalcId(Uuid);

impl CalcId {
    /// Fresh random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CalcId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CalcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalcId({})", self.0)
    }
}

impl fmt::Display for CalcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(CalcId::new(), CalcId::new());
    }

    #[test]
    fn uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = CalcId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
