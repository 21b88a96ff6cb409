use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier shared by every version of the same logical ticket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinearId {
    external_id: Option<String>,
    id: Uuid,
}

impl LinearId {
    pub fn new() -> Self {
        LinearId {
            external_id: None,
            id: Uuid::new_v4(),
        }
    }

    pub fn with_external_id(external_id: impl Into<String>) -> Self {
        LinearId {
            external_id: Some(external_id.into()),
            id: Uuid::new_v4(),
        }
    }

    pub fn from_uuid(id: Uuid) -> Self {
        LinearId {
            external_id: None,
            id,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

impl Default for LinearId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LinearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.external_id {
            Some(external_id) => write!(f, "{}_{}", external_id, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Accepts either a bare UUID or the `external_uuid` form produced by `Display`.
impl FromStr for LinearId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('_') {
            Some((external_id, id)) => Ok(LinearId {
                external_id: Some(external_id.to_string()),
                id: Uuid::parse_str(id)?,
            }),
            None => Ok(LinearId::from_uuid(Uuid::parse_str(s)?)),
        }
    }
}
