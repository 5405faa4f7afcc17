//! Single-field index declarations

use std::fmt;

/// Key order of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// MongoDB key value (`1` / `-1`)
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(SortDirection::Ascending),
            -1 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// A single-field secondary index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSpec {
    pub field: String,
    pub direction: SortDirection,
    pub unique: bool,
}

impl IndexSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
            unique: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The implicit primary-key index every collection carries
    pub fn primary() -> Self {
        Self::ascending("_id").unique()
    }

    /// MongoDB-style name, e.g. `creator_1`
    pub fn name(&self) -> String {
        if self.field == "_id" {
            return "_id_".to_string();
        }
        format!("{}_{}", self.field, self.direction.as_i32())
    }

    pub fn is_primary(&self) -> bool {
        self.field == "_id"
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if self.unique && !self.is_primary() {
            write!(f, " (unique)")?;
        }
        Ok(())
    }
}
