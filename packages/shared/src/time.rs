//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};

/// Format used for every timestamp shown to the user.
pub const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Naive ISO-8601 layouts accepted when a timestamp carries no offset.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given instant
    pub fn new(fixed_time: DateTime<Utc>) -> Self {
        Self { fixed_time }
    }

    /// Create a new fixed clock from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of the representable range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        from_epoch_millis(millis).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// How timestamps are rendered for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeDisplay {
    /// The host's local time zone
    #[default]
    Local,
    /// A fixed UTC offset (mostly for tests and headless hosts)
    Fixed(FixedOffset),
}

impl TimeDisplay {
    /// Render an instant with [`DISPLAY_FORMAT`].
    pub fn render(&self, instant: DateTime<Utc>) -> String {
        match self {
            TimeDisplay::Local => instant
                .with_timezone(&Local)
                .format(DISPLAY_FORMAT)
                .to_string(),
            TimeDisplay::Fixed(offset) => instant
                .with_timezone(offset)
                .format(DISPLAY_FORMAT)
                .to_string(),
        }
    }
}

/// Convert Unix milliseconds to a UTC instant
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Parse a timestamp sent by the server.
///
/// RFC 3339 is tried first. Timestamps without an offset are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Current instant in RFC 3339 (used by the server when stamping messages)
pub fn now_rfc3339(clock: &dyn Clock) -> String {
    clock.now().to_rfc3339()
}
