//! Logging and metrics shared by the coordinators.

use domain::{ErrorKind, ReservationError};

/// Records a rejected operation under `reservations_rejected{operation, kind}`.
pub(crate) fn record_rejection(operation: &'static str, err: &ReservationError) {
    let kind = err.kind();
    metrics::counter!(
        "reservations_rejected",
        "operation" => operation,
        "kind" => kind.as_str()
    )
    .increment(1);

    match kind {
        ErrorKind::Contention => tracing::warn!(operation, error = %err, "commit lost a race"),
        ErrorKind::StoreFailure => tracing::error!(operation, error = %err, "store failure"),
        _ => tracing::debug!(operation, kind = kind.as_str(), error = %err, "request rejected"),
    }
}
