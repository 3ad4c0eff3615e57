//! Seat identifiers.

use serde::{Deserialize, Serialize};

/// Names one physical seat within an event, e.g. `"A-12"`.
///
/// Seat identifiers are opaque strings; two seats are the same seat exactly
/// when their identifiers are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    /// Creates a seat identifier from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the seat identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SeatId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SeatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SeatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds a list of seat ids from string literals.
pub fn seats<I, S>(ids: I) -> Vec<SeatId>
where
    I: IntoIterator<Item = S>,
    S: Into<SeatId>,
{
    ids.into_iter().map(Into::into).collect()
}

/// Most seat ids quoted back in one message.
pub const MAX_LISTED_SEATS: usize = 10;

/// Comma-separated seat ids for messages, capped at [`MAX_LISTED_SEATS`].
pub fn describe_seats(seats: &[SeatId]) -> String {
    let mut listed = seats
        .iter()
        .take(MAX_LISTED_SEATS)
        .map(SeatId::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if seats.len() > MAX_LISTED_SEATS {
        listed.push_str(&format!(" and {} more", seats.len() - MAX_LISTED_SEATS));
    }
    listed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_id_string_conversion() {
        let id = SeatId::new("A-1");
        assert_eq!(id.as_str(), "A-1");

        let id2: SeatId = "B-2".into();
        assert_eq!(id2.to_string(), "B-2");
    }

    #[test]
    fn test_blank_detection() {
        assert!(SeatId::new("").is_blank());
        assert!(SeatId::new("  ").is_blank());
        assert!(!SeatId::new("A-1").is_blank());
    }

    #[test]
    fn test_describe_seats_caps_listing() {
        assert_eq!(describe_seats(&seats(["A-1", "A-2"])), "A-1, A-2");

        let many: Vec<SeatId> = (0..25).map(|n| SeatId::new(format!("S-{n}"))).collect();
        let text = describe_seats(&many);
        assert!(text.starts_with("S-0, S-1,"));
        assert!(text.ends_with("S-9 and 15 more"));
    }
}
