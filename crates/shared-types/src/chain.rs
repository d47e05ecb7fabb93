//! Chain side of the bridge pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two bridged chains a component talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSide {
    /// The chain holding the value token and the gateway.
    Origin,
    /// The chain holding the utility token and the co-gateway.
    Auxiliary,
}

impl ChainSide {
    /// The other side of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Self::Origin => Self::Auxiliary,
            Self::Auxiliary => Self::Origin,
        }
    }

    /// Static label used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Auxiliary => "auxiliary",
        }
    }
}

impl fmt::Display for ChainSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
