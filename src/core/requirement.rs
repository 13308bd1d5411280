//! Requirement specifications.
//!
//! A requirement is whatever pip accepts on its command line
//! (`requests==2.32.3`, `numpy>=2`, `demo`). It is not parsed here, only
//! carried through to the fetcher and installer.

use std::fmt;
use std::str::FromStr;

use crate::core::archive::MAX_NAME_LEN;

/// An opaque requirement string such as `demo==1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementSpec(String);

impl RequirementSpec {
    /// Create a requirement, rejecting blank input and anything longer
    /// than a payload can carry.
    pub fn new(spec: impl Into<String>) -> Option<Self> {
        let spec = spec.into();
        if spec.trim().is_empty() || spec.len() > MAX_NAME_LEN {
            None
        } else {
            Some(RequirementSpec(spec))
        }
    }

    /// The requirement exactly as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequirementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequirementSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_NAME_LEN {
            return Err(format!(
                "requirement is {} bytes long, the limit is {}",
                s.len(),
                MAX_NAME_LEN
            ));
        }
        RequirementSpec::new(s).ok_or_else(|| "requirement cannot be empty".to_string())
    }
}

impl AsRef<str> for RequirementSpec {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
