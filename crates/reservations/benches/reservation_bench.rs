use common::{EventId, OwnerId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Caller, EventInventory, Money, ReservationRequest};
use inventory_store::{InMemoryReservationStore, ReservationStoreExt};
use reservations::{CancellationCoordinator, ReservationCoordinator};

async fn store_with_event(total_seats: u32) -> (InMemoryReservationStore, EventId) {
    let store = InMemoryReservationStore::new();
    let inventory = EventInventory::new(EventId::new(), total_seats, Money::from_cents(1500)).unwrap();
    let event_id = inventory.id();
    store.insert_inventory(inventory).await.unwrap();
    (store, event_id)
}

fn bench_reserve_single_seat(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("reservations/reserve_single_seat", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (store, event_id) = store_with_event(100).await;
                ReservationCoordinator::new(store)
                    .reserve(
                        OwnerId::new(),
                        ReservationRequest::new(event_id, 1, ["A-1"]),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_reserve_into_busy_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, event_id) = rt.block_on(store_with_event(1_000_000));
    let coordinator = ReservationCoordinator::new(store);

    // Pre-book 1000 seats so validation checks against a large booked set
    rt.block_on(async {
        for i in 0..1000 {
            coordinator
                .reserve(
                    OwnerId::new(),
                    ReservationRequest::new(event_id, 1, [format!("PRE-{i}")]),
                )
                .await
                .unwrap();
        }
    });

    let mut next = 0u64;
    c.bench_function("reservations/reserve_into_busy_event", |b| {
        b.iter(|| {
            next += 1;
            let seat = format!("SEAT-{next}");
            rt.block_on(async {
                coordinator
                    .reserve(OwnerId::new(), ReservationRequest::new(event_id, 1, [seat]))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_reserve_then_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, event_id) = rt.block_on(store_with_event(10));
    let reserve = ReservationCoordinator::new(store.clone());
    let cancel = CancellationCoordinator::new(store);

    c.bench_function("reservations/reserve_then_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                let owner = OwnerId::new();
                let booking = reserve
                    .reserve(
                        owner,
                        ReservationRequest::new(event_id, 4, ["A-1", "A-2", "A-3", "A-4"]),
                    )
                    .await
                    .unwrap();
                cancel
                    .cancel(&Caller::user(owner), booking.id())
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_reserve_single_seat,
    bench_reserve_into_busy_event,
    bench_reserve_then_cancel
);
criterion_main!(benches);
