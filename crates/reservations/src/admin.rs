//! Inventory management for event administrators.

use common::EventId;
use domain::{BookingStatus, EventInventory, Money, ReservationError};
use inventory_store::{BookingQuery, ReservationStore, ReservationStoreExt};

use crate::outcome::record_rejection;

/// Creates and revises event inventories.
///
/// Revisions go through the same versioned commit as reservations, so an
/// admin edit racing a booking on the same event surfaces as `Contention`
/// instead of overwriting it.
#[derive(Clone)]
pub struct InventoryAdmin<S: ReservationStore> {
    store: S,
}

impl<S: ReservationStore> InventoryAdmin<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates the seat inventory for `event_id` with every seat available.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        event_id: EventId,
        total_seats: u32,
        unit_price: Money,
    ) -> Result<EventInventory, ReservationError> {
        let result: Result<EventInventory, ReservationError> = async {
            let inventory = EventInventory::new(event_id, total_seats, unit_price)?;
            self.store.insert_inventory(inventory.clone()).await?;
            Ok(inventory)
        }
        .await;

        match &result {
            Ok(_) => tracing::info!("inventory created"),
            Err(err) => record_rejection("create_inventory", err),
        }
        result
    }

    /// Changes the total seat count, keeping every booked seat booked.
    ///
    /// Fails with `InvalidRequest` if the new total is zero or below the
    /// number of booked seats.
    #[tracing::instrument(skip(self))]
    pub async fn revise_total_seats(
        &self,
        event_id: EventId,
        total_seats: u32,
    ) -> Result<EventInventory, ReservationError> {
        let result = self
            .revise(event_id, |inventory| {
                inventory.revise_total_seats(total_seats)
            })
            .await;
        if let Err(err) = &result {
            record_rejection("revise_total_seats", err);
        }
        result
    }

    /// Changes the unit price charged to future bookings.
    ///
    /// Existing bookings keep the amount they were confirmed with.
    #[tracing::instrument(skip(self))]
    pub async fn revise_unit_price(
        &self,
        event_id: EventId,
        unit_price: Money,
    ) -> Result<EventInventory, ReservationError> {
        let result = self
            .revise(event_id, |inventory| inventory.set_unit_price(unit_price))
            .await;
        if let Err(err) = &result {
            record_rejection("revise_unit_price", err);
        }
        result
    }

    /// Deletes the inventory of an event that has no confirmed bookings.
    ///
    /// Cancelled bookings stay in the ledger. A booking confirmed after the
    /// inventory was read bumps its version, so the removal then fails with
    /// `Contention` instead of orphaning the booking.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, event_id: EventId) -> Result<(), ReservationError> {
        let result = self.try_delete(event_id).await;
        match &result {
            Ok(()) => tracing::info!("inventory deleted"),
            Err(err) => record_rejection("delete_inventory", err),
        }
        result
    }

    async fn try_delete(&self, event_id: EventId) -> Result<(), ReservationError> {
        let mut scope = self.store.begin();
        let inventory = scope
            .inventory(event_id)
            .await?
            .ok_or_else(|| ReservationError::event_not_found(event_id))?;

        let confirmed = self
            .store
            .query_bookings(
                BookingQuery::for_event(event_id)
                    .status(BookingStatus::Confirmed)
                    .limit(1),
            )
            .await?;
        if !confirmed.is_empty() || inventory.booked_count() > 0 {
            return Err(ReservationError::invalid(
                "Cannot delete an event with confirmed bookings. Cancel all bookings first",
            ));
        }

        scope.remove_inventory(event_id);
        scope.commit().await?;
        Ok(())
    }

    pub async fn get(&self, event_id: EventId) -> Result<EventInventory, ReservationError> {
        self.store
            .load_inventory(event_id)
            .await?
            .map(|record| record.into_inner())
            .ok_or_else(|| ReservationError::event_not_found(event_id))
    }

    pub async fn list(&self) -> Result<Vec<EventInventory>, ReservationError> {
        Ok(self.store.list_inventories().await?)
    }

    async fn revise<F>(
        &self,
        event_id: EventId,
        change: F,
    ) -> Result<EventInventory, ReservationError>
    where
        F: FnOnce(&mut EventInventory) -> Result<(), domain::InventoryError>,
    {
        let mut scope = self.store.begin();
        let mut inventory = scope
            .inventory(event_id)
            .await?
            .ok_or_else(|| ReservationError::event_not_found(event_id))?;

        change(&mut inventory)?;

        scope.stage_inventory(inventory.clone());
        scope.commit().await?;
        tracing::info!(
            total = inventory.total_seats(),
            available = inventory.available_seats(),
            price = %inventory.unit_price(),
            "inventory revised"
        );
        Ok(inventory)
    }
}
