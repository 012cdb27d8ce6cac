//! Collection kinds and their index table.
//!
//! # Invariants
//! - Every filter or order field used against a kind must appear in that
//!   kind's index table; the gateway rejects anything else before any I/O.
//! - `created` is the order field for every kind.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned numeric identity. `0` means "not yet stored".
pub type EntityId = i64;

/// Stored document field names shared by filters, ordering and export.
pub mod fields {
    pub const AC_ID: &str = "acID";
    pub const AS_ID: &str = "asID";
    pub const CP_ID: &str = "cpID";
    pub const DV_ID: &str = "dvID";
    pub const NT_ID: &str = "ntID";
    pub const CREATED: &str = "created";
}

/// Logical collection of one entity type in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    Actions,
    Assignments,
    Callpoints,
    Devices,
    Notifications,
    Events,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Actions,
        Kind::Assignments,
        Kind::Callpoints,
        Kind::Devices,
        Kind::Notifications,
        Kind::Events,
    ];

    /// Collection name used by store backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actions => "Actions",
            Self::Assignments => "Assignments",
            Self::Callpoints => "Callpoints",
            Self::Devices => "Devices",
            Self::Notifications => "Notifications",
            Self::Events => "Events",
        }
    }

    /// Parses a collection name, case-insensitively.
    pub fn parse(value: &str) -> Option<Kind> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Fields that can be used in an equality filter on this kind.
    pub fn filter_fields(self) -> &'static [&'static str] {
        match self {
            Self::Actions => &[fields::AC_ID],
            Self::Assignments => &[fields::AS_ID, fields::CP_ID],
            Self::Callpoints => &[fields::CP_ID],
            Self::Devices => &[fields::DV_ID],
            Self::Notifications => &[fields::AC_ID],
            Self::Events => &[fields::CP_ID, fields::NT_ID],
        }
    }

    /// Fields that can be used as a sort key on this kind.
    pub fn order_fields(self) -> &'static [&'static str] {
        &[fields::CREATED]
    }

    pub fn is_filterable(self, field: &str) -> bool {
        self.filter_fields().contains(&field)
    }

    pub fn is_orderable(self, field: &str) -> bool {
        self.order_fields().contains(&field)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{fields, Kind};

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(Kind::parse("events"), Some(Kind::Events));
        assert_eq!(Kind::parse(" Callpoints "), Some(Kind::Callpoints));
        assert_eq!(Kind::parse("widgets"), None);
    }

    #[test]
    fn index_table_matches_collection_contract() {
        assert!(Kind::Assignments.is_filterable(fields::CP_ID));
        assert!(Kind::Events.is_filterable(fields::NT_ID));
        assert!(!Kind::Notifications.is_filterable(fields::NT_ID));
        assert!(Kind::ALL
            .into_iter()
            .all(|kind| kind.is_orderable(fields::CREATED)));
    }
}
