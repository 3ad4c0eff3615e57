//! Seat inventory for a single event.

use std::collections::BTreeSet;

use common::EventId;
use thiserror::Error;

use crate::{Money, ReservationError, SeatId, describe_seats};

/// Largest seat capacity an event may have; counts are stored as 32-bit
/// signed integers.
pub const MAX_TOTAL_SEATS: u32 = i32::MAX as u32;

/// Errors raised when an inventory mutation would break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Total seats must be at least 1")]
    ZeroCapacity,

    #[error("Total seats cannot exceed {max}: got {requested}")]
    CapacityTooLarge { requested: u32, max: u32 },

    #[error("Unit price cannot be negative: {0}")]
    NegativePrice(Money),

    #[error("Cannot reduce total seats to {requested}: {booked} seats are booked")]
    CapacityBelowBooked { requested: u32, booked: u32 },

    #[error("Seats listed more than once: {}", describe_seats(.0))]
    DuplicateSeats(Vec<SeatId>),

    #[error("Seats already held: {}", describe_seats(.0))]
    SeatsAlreadyHeld(Vec<SeatId>),

    #[error("Seats not held by this event: {}", describe_seats(.0))]
    SeatsNotHeld(Vec<SeatId>),

    #[error("Requested {requested} seats, {remaining} remaining")]
    Insufficient { requested: u32, remaining: u32 },

    #[error(
        "Inventory {event_id} is inconsistent: {total} total, {available} available, {booked} booked"
    )]
    Inconsistent {
        event_id: EventId,
        total: u32,
        available: u32,
        booked: u32,
    },
}

impl From<InventoryError> for ReservationError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::ZeroCapacity
            | InventoryError::CapacityTooLarge { .. }
            | InventoryError::NegativePrice(_)
            | InventoryError::CapacityBelowBooked { .. }
            | InventoryError::DuplicateSeats(_) => {
                ReservationError::InvalidRequest(e.to_string())
            }
            InventoryError::SeatsAlreadyHeld(seats) => ReservationError::SeatConflict { seats },
            InventoryError::Insufficient {
                requested,
                remaining,
            } => ReservationError::InsufficientInventory {
                requested,
                remaining,
            },
            InventoryError::SeatsNotHeld(_) | InventoryError::Inconsistent { .. } => {
                ReservationError::StoreFailure(e.to_string())
            }
        }
    }
}

/// The seat-capacity record for one bookable event.
///
/// `available_seats == total_seats - booked_seat_ids.len()` holds for every
/// value this type hands out; each mutator either preserves it or fails
/// without changing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInventory {
    id: EventId,
    total_seats: u32,
    available_seats: u32,
    booked_seat_ids: BTreeSet<SeatId>,
    unit_price: Money,
}

impl EventInventory {
    /// Creates an empty inventory with every seat available.
    pub fn new(id: EventId, total_seats: u32, unit_price: Money) -> Result<Self, InventoryError> {
        check_capacity(total_seats)?;
        if unit_price.is_negative() {
            return Err(InventoryError::NegativePrice(unit_price));
        }

        Ok(Self {
            id,
            total_seats,
            available_seats: total_seats,
            booked_seat_ids: BTreeSet::new(),
            unit_price,
        })
    }

    /// Rebuilds an inventory from persisted fields, rejecting inconsistent rows.
    pub fn from_parts(
        id: EventId,
        total_seats: u32,
        available_seats: u32,
        booked_seat_ids: impl IntoIterator<Item = SeatId>,
        unit_price: Money,
    ) -> Result<Self, InventoryError> {
        let inventory = Self {
            id,
            total_seats,
            available_seats,
            booked_seat_ids: booked_seat_ids.into_iter().collect(),
            unit_price,
        };

        if total_seats == 0 {
            return Err(InventoryError::ZeroCapacity);
        }
        if unit_price.is_negative() {
            return Err(InventoryError::NegativePrice(unit_price));
        }
        inventory.check_consistency()?;
        Ok(inventory)
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn available_seats(&self) -> u32 {
        self.available_seats
    }

    pub fn booked_seat_ids(&self) -> &BTreeSet<SeatId> {
        &self.booked_seat_ids
    }

    pub fn booked_count(&self) -> u32 {
        self.booked_seat_ids.len() as u32
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn is_booked(&self, seat: &SeatId) -> bool {
        self.booked_seat_ids.contains(seat)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_seats == 0
    }

    /// Price of `seats` seats at the current unit price.
    pub fn price_for(&self, seats: u32) -> Option<Money> {
        self.unit_price.checked_multiply(seats)
    }

    /// Verifies the available-count invariant.
    pub fn check_consistency(&self) -> Result<(), InventoryError> {
        let booked = self.booked_seat_ids.len();
        let consistent = booked <= self.total_seats as usize
            && self.available_seats as usize == self.total_seats as usize - booked;

        if consistent {
            Ok(())
        } else {
            Err(InventoryError::Inconsistent {
                event_id: self.id,
                total: self.total_seats,
                available: self.available_seats,
                booked: booked as u32,
            })
        }
    }

    /// Marks `seats` as booked and debits the available count.
    pub fn hold_seats(&mut self, seats: &[SeatId]) -> Result<(), InventoryError> {
        let duplicates = duplicate_seats(seats);
        if !duplicates.is_empty() {
            return Err(InventoryError::DuplicateSeats(duplicates));
        }

        let already: Vec<SeatId> = seats
            .iter()
            .filter(|s| self.booked_seat_ids.contains(*s))
            .cloned()
            .collect();
        if !already.is_empty() {
            return Err(InventoryError::SeatsAlreadyHeld(already));
        }

        let requested = seats.len() as u32;
        if self.available_seats < requested {
            return Err(InventoryError::Insufficient {
                requested,
                remaining: self.available_seats,
            });
        }

        self.booked_seat_ids.extend(seats.iter().cloned());
        self.available_seats -= requested;
        self.check_consistency()
    }

    /// Returns `seats` to the pool, removing them by value.
    pub fn release_seats(&mut self, seats: &[SeatId]) -> Result<(), InventoryError> {
        let missing: Vec<SeatId> = seats
            .iter()
            .filter(|s| !self.booked_seat_ids.contains(*s))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(InventoryError::SeatsNotHeld(missing));
        }

        let mut released = 0;
        for seat in seats {
            if self.booked_seat_ids.remove(seat) {
                released += 1;
            }
        }
        self.available_seats += released;
        self.check_consistency()
    }

    /// Changes the seat capacity, recomputing the available count from the
    /// seats already booked.
    pub fn revise_total_seats(&mut self, total_seats: u32) -> Result<(), InventoryError> {
        check_capacity(total_seats)?;
        let booked = self.booked_count();
        if total_seats < booked {
            return Err(InventoryError::CapacityBelowBooked {
                requested: total_seats,
                booked,
            });
        }

        self.total_seats = total_seats;
        self.available_seats = total_seats - booked;
        Ok(())
    }

    /// Changes the unit price applied to future bookings.
    pub fn set_unit_price(&mut self, unit_price: Money) -> Result<(), InventoryError> {
        if unit_price.is_negative() {
            return Err(InventoryError::NegativePrice(unit_price));
        }
        self.unit_price = unit_price;
        Ok(())
    }
}

fn check_capacity(total_seats: u32) -> Result<(), InventoryError> {
    if total_seats == 0 {
        return Err(InventoryError::ZeroCapacity);
    }
    if total_seats > MAX_TOTAL_SEATS {
        return Err(InventoryError::CapacityTooLarge {
            requested: total_seats,
            max: MAX_TOTAL_SEATS,
        });
    }
    Ok(())
}

/// Seats that appear more than once in `seats`, in first-repeat order.
pub fn duplicate_seats(seats: &[SeatId]) -> Vec<SeatId> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut duplicates = Vec::new();
    for seat in seats {
        if !seen.insert(seat) && reported.insert(seat) {
            duplicates.push(seat.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seats;

    fn inventory(total: u32) -> EventInventory {
        EventInventory::new(EventId::new(), total, Money::from_cents(2500)).unwrap()
    }

    #[test]
    fn new_inventory_is_fully_available() {
        let inv = inventory(10);
        assert_eq!(inv.available_seats(), 10);
        assert!(inv.booked_seat_ids().is_empty());
        assert!(inv.check_consistency().is_ok());
    }

    #[test]
    fn rejects_zero_capacity_and_negative_price() {
        assert_eq!(
            EventInventory::new(EventId::new(), 0, Money::zero()),
            Err(InventoryError::ZeroCapacity)
        );
        assert!(matches!(
            EventInventory::new(EventId::new(), 5, Money::from_cents(-1)),
            Err(InventoryError::NegativePrice(_))
        ));
    }

    #[test]
    fn hold_then_release_restores_state() {
        let mut inv = inventory(10);
        let before = inv.clone();

        inv.hold_seats(&seats(["A-1", "A-2"])).unwrap();
        assert_eq!(inv.available_seats(), 8);
        assert!(inv.is_booked(&SeatId::new("A-1")));

        inv.release_seats(&seats(["A-2", "A-1"])).unwrap();
        assert_eq!(inv, before);
    }

    #[test]
    fn hold_rejects_held_seats_without_mutating() {
        let mut inv = inventory(10);
        inv.hold_seats(&seats(["A-1", "A-2"])).unwrap();
        let before = inv.clone();

        let err = inv.hold_seats(&seats(["A-2", "A-3"])).unwrap_err();
        assert_eq!(err, InventoryError::SeatsAlreadyHeld(seats(["A-2"])));
        assert_eq!(inv, before);
    }

    #[test]
    fn release_rejects_unheld_seats_without_mutating() {
        let mut inv = inventory(10);
        inv.hold_seats(&seats(["A-1"])).unwrap();
        let before = inv.clone();

        let err = inv.release_seats(&seats(["A-1", "Z-9"])).unwrap_err();
        assert_eq!(err, InventoryError::SeatsNotHeld(seats(["Z-9"])));
        assert_eq!(inv, before);
    }

    #[test]
    fn release_is_duplicate_safe() {
        let mut inv = inventory(10);
        inv.hold_seats(&seats(["A-1", "A-2"])).unwrap();

        inv.release_seats(&seats(["A-1", "A-1"])).unwrap();
        assert_eq!(inv.available_seats(), 9);
        assert!(inv.is_booked(&SeatId::new("A-2")));
    }

    #[test]
    fn hold_rejects_repeated_seats() {
        let mut inv = inventory(10);
        let err = inv.hold_seats(&seats(["A-1", "A-1"])).unwrap_err();
        assert_eq!(err, InventoryError::DuplicateSeats(seats(["A-1"])));
        assert_eq!(inv.available_seats(), 10);
    }

    #[test]
    fn rejects_capacity_beyond_storable_range() {
        let too_many = MAX_TOTAL_SEATS + 1;
        assert_eq!(
            EventInventory::new(EventId::new(), too_many, Money::zero()),
            Err(InventoryError::CapacityTooLarge {
                requested: too_many,
                max: MAX_TOTAL_SEATS
            })
        );
        assert!(EventInventory::new(EventId::new(), MAX_TOTAL_SEATS, Money::zero()).is_ok());

        let mut inv = inventory(10);
        let before = inv.clone();
        let err = inv.revise_total_seats(u32::MAX).unwrap_err();
        assert_eq!(
            ReservationError::from(err).kind(),
            crate::ErrorKind::InvalidRequest
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn duplicate_seats_reports_each_repeat_once() {
        let found = duplicate_seats(&seats(["A-1", "B-1", "A-1", "A-1", "B-1", "C-1"]));
        assert_eq!(found, seats(["A-1", "B-1"]));
    }

    #[test]
    fn hold_rejects_many_repeats_with_short_message() {
        let distinct: Vec<SeatId> = (0..50_000).map(|n| SeatId::new(format!("S-{n}"))).collect();
        let mut doubled = distinct.clone();
        doubled.extend(distinct);

        let mut inv = inventory(10);
        let err = inv.hold_seats(&doubled).unwrap_err();
        assert!(matches!(&err, InventoryError::DuplicateSeats(d) if d.len() == 50_000));
        assert!(err.to_string().len() < 200);
        assert_eq!(inv.available_seats(), 10);
    }

    #[test]
    fn revise_total_keeps_invariant() {
        let mut inv = inventory(10);
        inv.hold_seats(&seats(["A-1", "A-2", "A-3"])).unwrap();

        inv.revise_total_seats(20).unwrap();
        assert_eq!(inv.available_seats(), 17);

        inv.revise_total_seats(3).unwrap();
        assert_eq!(inv.available_seats(), 0);
        assert!(inv.is_sold_out());

        assert_eq!(
            inv.revise_total_seats(2),
            Err(InventoryError::CapacityBelowBooked {
                requested: 2,
                booked: 3
            })
        );
        assert!(inv.check_consistency().is_ok());
    }

    #[test]
    fn from_parts_rejects_inconsistent_rows() {
        let err = EventInventory::from_parts(
            EventId::new(),
            10,
            10,
            seats(["A-1"]),
            Money::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, InventoryError::Inconsistent { .. }));
    }

    #[test]
    fn inventory_errors_map_to_reservation_kinds() {
        use crate::ErrorKind;

        let cases = [
            (InventoryError::ZeroCapacity, ErrorKind::InvalidRequest),
            (
                InventoryError::SeatsAlreadyHeld(seats(["A-1"])),
                ErrorKind::SeatConflict,
            ),
            (
                InventoryError::Insufficient {
                    requested: 2,
                    remaining: 1,
                },
                ErrorKind::InsufficientInventory,
            ),
            (
                InventoryError::SeatsNotHeld(seats(["A-1"])),
                ErrorKind::StoreFailure,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(ReservationError::from(err).kind(), kind);
        }
    }
}
