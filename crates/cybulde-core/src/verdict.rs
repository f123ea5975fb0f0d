//! Verdicts returned by the classification service and their presentation.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Binary classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Harmless = 0,
    Cyberbullying = 1,
}

/// A verdict value outside {0, 1}.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("verdict must be 0 or 1, got {0}")]
pub struct InvalidVerdict(pub Value);

impl Verdict {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_flagged(self) -> bool {
        self == Self::Cyberbullying
    }

    /// Presentation for this verdict. Total: every verdict has exactly one.
    pub fn outcome(self) -> PresentationOutcome {
        PresentationOutcome::for_verdict(self)
    }
}

impl TryFrom<i64> for Verdict {
    type Error = InvalidVerdict;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Harmless),
            1 => Ok(Self::Cyberbullying),
            other => Err(InvalidVerdict(Value::from(other))),
        }
    }
}

impl TryFrom<&Value> for Verdict {
    type Error = InvalidVerdict;

    /// Coerce a JSON value into a verdict.
    ///
    /// Accepts integers 0/1, booleans, and floats that are exactly 0.0 or 1.0.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let invalid = || InvalidVerdict(value.clone());
        match value {
            Value::Bool(false) => Ok(Self::Harmless),
            Value::Bool(true) => Ok(Self::Cyberbullying),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::try_from(i).map_err(|_| invalid())
                } else if let Some(f) = n.as_f64() {
                    if f == 0.0 {
                        Ok(Self::Harmless)
                    } else if f == 1.0 {
                        Ok(Self::Cyberbullying)
                    } else {
                        Err(invalid())
                    }
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.outcome().label)
    }
}

/// Which configured list of illustrative assets a verdict draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetPool {
    Harmless,
    Cyberbullying,
}

impl AssetPool {
    /// Configuration key holding this pool.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Harmless => "harmless_gifs",
            Self::Cyberbullying => "cyberbullying_gifs",
        }
    }
}

pub const HARMLESS_COLOR: &str = "#5ed938";
pub const CYBERBULLYING_COLOR: &str = "#ed0c0c";

/// Label, color and asset pool shown for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationOutcome {
    pub label: &'static str,
    /// Hex color code, `#rrggbb`.
    pub color: &'static str,
    pub pool: AssetPool,
}

impl PresentationOutcome {
    pub const fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Harmless => Self {
                label: "harmless",
                color: HARMLESS_COLOR,
                pool: AssetPool::Harmless,
            },
            Verdict::Cyberbullying => Self {
                label: "cyberbullying",
                color: CYBERBULLYING_COLOR,
                pool: AssetPool::Cyberbullying,
            },
        }
    }
}

/// Text returned by the cleaning service.
///
/// The classification stage only accepts this type, never raw input. It may
/// be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText(String);

impl CleanedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CleanedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
