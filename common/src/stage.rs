use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Las tres etapas del pipeline, en orden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Map,
    Shuffle,
    Reduce,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Map => "map",
            Stage::Shuffle => "shuffle",
            Stage::Reduce => "reduce",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" => Ok(Stage::Map),
            "shuffle" => Ok(Stage::Shuffle),
            "reduce" => Ok(Stage::Reduce),
            other => Err(format!("etapa desconocida: {other}")),
        }
    }
}
