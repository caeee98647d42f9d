use super::*;

/// Wall-clock source for age computations.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Parse a lifetime annotation value written as a Go duration.
///
/// # Examples
///
/// ```
/// let lifetime = pod_janitor::parse_lifetime("1h30m").unwrap();
/// assert_eq!(lifetime.whole_minutes(), 90);
/// assert!(pod_janitor::parse_lifetime("soon").is_err());
/// ```
pub fn parse_lifetime(text: &str) -> Result<Duration> {
    let invalid = |reason: String| Error::InvalidLifetime {
        value: text.to_string(),
        reason,
    };
    let nanos = go_parse_duration::parse_duration(text.trim())
        .map_err(|err| invalid(format!("{err:?}")))?;
    if nanos < 0 {
        return Err(invalid("negative duration".to_string()));
    }
    Ok(Duration::nanoseconds(nanos))
}

const AGE_UNITS: [(i64, &str); 4] = [(86_400, "days"), (3_600, "hrs"), (60, "min"), (1, "sec")];

/// Render an age rounded down to whole seconds, e.g. `2hrs 3min 4sec`.
pub fn format_age(age: Duration) -> String {
    let mut remainder = age.whole_seconds().max(0);
    let mut parts = Vec::new();
    for (unit, label) in AGE_UNITS {
        let count = remainder / unit;
        remainder %= unit;
        if count > 0 {
            parts.push(format!("{count}{label}"));
        }
    }
    if parts.is_empty() {
        "0sec".to_string()
    } else {
        parts.join(" ")
    }
}
