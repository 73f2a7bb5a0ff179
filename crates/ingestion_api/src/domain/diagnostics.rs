use common::domain::Reading;
use futures::{Stream, StreamExt};
use tracing::info;

/// Drain a diagnostics stream to its end, logging every reading.
///
/// Returns the number of readings received. The first stream error stops the
/// drain and is handed back unchanged.
pub async fn drain_diagnostics<S, E>(mut readings: S) -> Result<usize, E>
where
    S: Stream<Item = Result<Reading, E>> + Unpin,
{
    let mut received = 0usize;
    while let Some(reading) = readings.next().await {
        let reading = reading?;
        received += 1;
        info!(
            customer_id = reading.customer_id,
            value = reading.value,
            reading_time = %reading.timestamp,
            "diagnostic reading received"
        );
    }
    Ok(received)
}
