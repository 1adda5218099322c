use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Season(pub i32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playing position as recorded by the stats provider.
///
/// The four known raw labels map onto fixed two-letter codes. Anything else is
/// kept verbatim so a bad label still flows through scoring with a neutral bonus.
/// Serialized as its code. Ordering is GK, DF, MF, FW, then unknown labels.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
    Other(String),
}

impl Position {
    pub const KNOWN: [Position; 4] =
        [Position::Goalkeeper, Position::Defender, Position::Midfielder, Position::Attacker];

    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Goalkeeper" => Self::Goalkeeper,
            "Defender" => Self::Defender,
            "Midfielder" => Self::Midfielder,
            "Attacker" => Self::Attacker,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parses a stored two-letter code back into a position.
    pub fn from_code(code: &str) -> Self {
        match code {
            "GK" => Self::Goalkeeper,
            "DF" => Self::Defender,
            "MF" => Self::Midfielder,
            "FW" => Self::Attacker,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Goalkeeper => "GK",
            Self::Defender => "DF",
            Self::Midfielder => "MF",
            Self::Attacker => "FW",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Minimum squad headcount for this position; `None` for unknown labels.
    pub fn min_squad_size(&self) -> Option<u32> {
        match self {
            Self::Goalkeeper => Some(2),
            Self::Defender => Some(6),
            Self::Midfielder => Some(6),
            Self::Attacker => Some(4),
            Self::Other(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.code().to_string()
    }
}

impl From<String> for Position {
    fn from(code: String) -> Self {
        Position::from_code(&code)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub age: u32,
    pub position: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub season: Season,
}
