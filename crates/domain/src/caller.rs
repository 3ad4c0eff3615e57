//! Verified caller identity handed in by the authentication layer.

use common::OwnerId;

use crate::Booking;

/// The party invoking an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: OwnerId,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(id: OwnerId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    pub fn admin(id: OwnerId) -> Self {
        Self { id, is_admin: true }
    }

    /// True if the caller owns `booking` or holds the admin override.
    pub fn may_manage(&self, booking: &Booking) -> bool {
        self.is_admin || booking.owner_id() == self.id
    }
}
