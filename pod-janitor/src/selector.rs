use std::str::FromStr;

use super::*;

/// `phase[:reason]` selector for entities to consider for deletion.
///
/// # Examples
///
/// ```
/// use pod_janitor::StatusSelector;
///
/// let selector: StatusSelector = "Failed:Shutdown".parse().unwrap();
/// assert!(selector.matches("Failed", Some("Shutdown")));
/// assert!(!selector.matches("Failed", Some("OOMKilled")));
///
/// let selector: StatusSelector = "Succeeded".parse().unwrap();
/// assert!(selector.matches("Succeeded", None));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusSelector {
    phase: String,
    reason: ReasonMatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ReasonMatch {
    Any,
    Exactly(String),
}

impl StatusSelector {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelector(text.to_string());
        let mut bits = text.split(':');
        let phase = bits.next().filter(|phase| !phase.is_empty()).ok_or_else(invalid)?;
        let reason = bits
            .next()
            .map_or(ReasonMatch::Any, |reason| ReasonMatch::Exactly(reason.to_string()));
        if bits.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            phase: phase.to_string(),
            reason,
        })
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// The required reason; `None` accepts any reason, including none.
    pub fn reason(&self) -> Option<&str> {
        match &self.reason {
            ReasonMatch::Any => None,
            ReasonMatch::Exactly(reason) => Some(reason),
        }
    }

    pub fn matches(&self, phase: &str, reason: Option<&str>) -> bool {
        if self.phase != phase {
            return false;
        }
        match &self.reason {
            ReasonMatch::Any => true,
            ReasonMatch::Exactly(expected) => reason == Some(expected.as_str()),
        }
    }

    pub fn matches_entity(&self, entity: &WorkloadEntity) -> bool {
        self.matches(&entity.phase, entity.reason.as_deref())
    }
}

impl FromStr for StatusSelector {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl fmt::Display for StatusSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ReasonMatch::Any => f.write_str(&self.phase),
            ReasonMatch::Exactly(reason) => write!(f, "{}:{reason}", self.phase),
        }
    }
}
