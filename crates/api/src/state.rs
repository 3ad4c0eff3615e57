//! Shared application state.

use inventory_store::ReservationStore;
use reservations::{BookingLedger, CancellationCoordinator, InventoryAdmin, ReservationCoordinator};

/// Shared application state accessible from all handlers.
pub struct AppState<S: ReservationStore> {
    pub reservations: ReservationCoordinator<S>,
    pub cancellations: CancellationCoordinator<S>,
    pub inventory: InventoryAdmin<S>,
    pub ledger: BookingLedger<S>,
}

impl<S: ReservationStore + Clone> AppState<S> {
    /// Wires every coordinator to the same store.
    pub fn new(store: S) -> Self {
        Self {
            reservations: ReservationCoordinator::new(store.clone()),
            cancellations: CancellationCoordinator::new(store.clone()),
            inventory: InventoryAdmin::new(store.clone()),
            ledger: BookingLedger::new(store),
        }
    }
}
