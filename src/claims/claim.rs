//! Claim model types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The game world a claim belongs to.
///
/// Stored as its integer discriminant in the claims table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    TheEnd,
}

impl Dimension {
    /// Integer value used in the claims table.
    pub fn as_i64(self) -> i64 {
        match self {
            Dimension::Overworld => 0,
            Dimension::Nether => 1,
            Dimension::TheEnd => 2,
        }
    }

    /// Reverse of [`Dimension::as_i64`].
    pub fn from_i64(value: i64) -> Option<Dimension> {
        match value {
            0 => Some(Dimension::Overworld),
            1 => Some(Dimension::Nether),
            2 => Some(Dimension::TheEnd),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Overworld => "Overworld",
            Dimension::Nether => "Nether",
            Dimension::TheEnd => "The End",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Parses the user-typed dimension argument.
    ///
    /// Accepts a few spellings per dimension so `claims create 0 0 end`
    /// and `claims create 0 0 the_end` both work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overworld" | "ow" => Ok(Dimension::Overworld),
            "nether" => Ok(Dimension::Nether),
            "the_end" | "theend" | "end" => Ok(Dimension::TheEnd),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

/// A user-owned spatial reservation at integer coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Claim {
    pub user_id: i64,
    pub claim_x: i64,
    pub claim_y: i64,
    pub dimension: Dimension,
    pub claim_time: NaiveDateTime,
}

/// Optional per-column filter for claim selects.
///
/// Fields left `None` are omitted from the WHERE clause entirely, so an
/// empty filter selects every claim.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClaimFilter {
    pub user_id: Option<i64>,
    pub claim_x: Option<i64>,
    pub claim_y: Option<i64>,
    pub dimension: Option<Dimension>,
}

impl ClaimFilter {
    pub fn user(user_id: i64) -> Self {
        ClaimFilter {
            user_id: Some(user_id),
            ..ClaimFilter::default()
        }
    }

    pub fn in_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_roundtrip() {
        for dimension in [Dimension::Overworld, Dimension::Nether, Dimension::TheEnd] {
            assert_eq!(Dimension::from_i64(dimension.as_i64()), Some(dimension));
        }
        assert_eq!(Dimension::from_i64(3), None);
    }

    #[test]
    fn test_dimension_parse_spellings() {
        assert_eq!("overworld".parse::<Dimension>(), Ok(Dimension::Overworld));
        assert_eq!("Nether".parse::<Dimension>(), Ok(Dimension::Nether));
        assert_eq!("end".parse::<Dimension>(), Ok(Dimension::TheEnd));
        assert_eq!("the_end".parse::<Dimension>(), Ok(Dimension::TheEnd));
        assert!("aether".parse::<Dimension>().is_err());
    }
}
