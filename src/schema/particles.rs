//! Occurrence bounds for particles and attribute uses.

use std::fmt;

use crate::error::{ParseError, Result};

/// Occurrence constraints (`minOccurs`/`maxOccurs`) attached to a particle.
///
/// `max == None` encodes `maxOccurs="unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurs {
    /// Minimum number of occurrences.
    pub min: u32,
    /// Maximum number of occurrences, `None` for unbounded.
    pub max: Option<u32>,
}

impl Occurs {
    /// The default occurrence `(1, 1)`.
    pub fn once() -> Self {
        Occurs { min: 1, max: Some(1) }
    }

    /// Occurrence of an attribute use: `(1, 1)` when required, `(0, 1)` otherwise.
    pub fn attribute(required: bool) -> Self {
        Occurs {
            min: if required { 1 } else { 0 },
            max: Some(1),
        }
    }

    /// True when the particle may occur more than once.
    pub fn is_repeated(&self) -> bool {
        match self.max {
            None => true,
            Some(m) => m > 1,
        }
    }

    /// True when the particle may be absent.
    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    /// True when the bounds are exactly `(1, 1)`.
    pub fn is_once(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }

    /// Parse `minOccurs`/`maxOccurs` attribute values, either of which may
    /// be absent. `maxOccurs="unbounded"` maps to `max == None`.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let min = match min {
            None => 1,
            Some(v) => v
                .parse::<u32>()
                .map_err(|_| ParseError::new(format!("invalid minOccurs value '{v}'")))?,
        };
        let max = match max {
            None => Some(1),
            Some("unbounded") => None,
            Some(v) => Some(
                v.parse::<u32>()
                    .map_err(|_| ParseError::new(format!("invalid maxOccurs value '{v}'")))?,
            ),
        };
        if let Some(m) = max {
            if m < min {
                return Err(ParseError::new(format!(
                    "maxOccurs ({m}) must not be less than minOccurs ({min})"
                ))
                .into());
            }
        }
        Ok(Occurs { min, max })
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Occurs::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}..{}]", self.min, max),
            None => write!(f, "[{}..unbounded]", self.min),
        }
    }
}
