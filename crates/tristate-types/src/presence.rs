use std::fmt;

use serde::Serialize;

/// Which of the three wire states a [`Field`](crate::Field) is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// The key never appeared in the input.
    Absent,
    /// The key appeared with an explicit `null`.
    Null,
    /// The key appeared with a concrete value.
    Value,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
