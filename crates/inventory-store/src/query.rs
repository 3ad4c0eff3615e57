use common::{EventId, OwnerId};
use domain::{Booking, BookingStatus};

/// Builder for constructing booking ledger queries.
///
/// Results are always ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    /// Filter by booking owner.
    pub owner_id: Option<OwnerId>,

    /// Filter by event.
    pub event_id: Option<EventId>,

    /// Filter by status.
    pub status: Option<BookingStatus>,

    /// Maximum number of bookings to return.
    pub limit: Option<usize>,

    /// Number of bookings to skip.
    pub offset: Option<usize>,
}

impl BookingQuery {
    /// Creates a query matching every booking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one owner's bookings.
    pub fn for_owner(owner_id: OwnerId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    /// Creates a query for one event's bookings.
    pub fn for_event(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            ..Default::default()
        }
    }

    pub fn owner_id(mut self, id: OwnerId) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `booking` passes every filter of this query.
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(owner) = self.owner_id
            && booking.owner_id() != owner
        {
            return false;
        }
        if let Some(event) = self.event_id
            && booking.event_id() != event
        {
            return false;
        }
        if let Some(status) = self.status
            && booking.status() != status
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::BookingId;
    use domain::{Money, seats};

    fn booking(owner: OwnerId, event: EventId, status: BookingStatus) -> Booking {
        Booking::from_parts(
            BookingId::new(),
            owner,
            event,
            seats(["A-1"]),
            Money::from_cents(100),
            status,
            Utc::now(),
            Utc::now(),
        )
    }

    #[test]
    fn filters_combine() {
        let owner = OwnerId::new();
        let event = EventId::new();
        let query = BookingQuery::for_owner(owner)
            .event_id(event)
            .status(BookingStatus::Confirmed);

        assert!(query.matches(&booking(owner, event, BookingStatus::Confirmed)));
        assert!(!query.matches(&booking(owner, event, BookingStatus::Cancelled)));
        assert!(!query.matches(&booking(OwnerId::new(), event, BookingStatus::Confirmed)));
        assert!(!query.matches(&booking(owner, EventId::new(), BookingStatus::Confirmed)));
    }

    #[test]
    fn empty_query_matches_everything() {
        let b = booking(OwnerId::new(), EventId::new(), BookingStatus::Cancelled);
        assert!(BookingQuery::new().matches(&b));
    }
}
