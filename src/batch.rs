//! Batch driver (C10): processes every unprocessed ticket concurrently,
//! bounded to `max_concurrent` pipelines in flight at once, plus the
//! office-geocode reconciliation routine.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::error::RouterError;
use crate::pipeline::{ProcessingResult, TicketPipeline};

/// Pull every ticket without an analysis row and process it, keeping at
/// most `max_concurrent` pipelines in flight: a fresh ticket is only
/// pushed once a prior one has completed and freed a slot, so the bound
/// holds even though nothing is ever spawned onto the runtime.
pub async fn process_unprocessed_tickets(
    pipeline: &TicketPipeline,
    max_concurrent: usize,
) -> Result<Vec<ProcessingResult>, RouterError> {
    let tickets = pipeline.ticket_repository().get_unprocessed().await?;
    info!(count = tickets.len(), "batch processing unprocessed tickets");

    let limit = max_concurrent.max(1);
    let mut pending = tickets.into_iter();
    let mut tasks = FuturesUnordered::new();
    let mut results = Vec::new();

    loop {
        while tasks.len() < limit {
            let Some(ticket) = pending.next() else { break };
            let failed_ticket = ticket.clone();
            tasks.push(async move {
                match pipeline.process(ticket).await {
                    Ok(result) => result,
                    Err(e) => ProcessingResult::failed(&failed_ticket, false, e.to_string()),
                }
            });
        }

        match tasks.next().await {
            Some(result) => results.push(result),
            None => break,
        }
    }

    let successful = results.iter().filter(|r| r.error.is_none()).count();
    info!(successful, total = results.len(), "batch complete");
    Ok(results)
}

/// Geocode every office missing a location, persisting the resolved
/// point. Offices that still fail to resolve are left as-is and logged —
/// they remain eligible for the hub fallback but not `select_nearest`.
pub async fn reconcile_office_geocodes(pipeline: &TicketPipeline) -> Result<usize, RouterError> {
    let offices = pipeline.office_repository().get_all().await?;
    let mut resolved = 0;

    for office in offices.into_iter().filter(|o| o.needs_geocode()) {
        match pipeline.geocoder().geocode(&office.address).await {
            Some(point) => {
                pipeline.office_repository().update_location(office.id, point).await?;
                resolved += 1;
                info!(office = %office.name, "resolved office geocode");
            }
            None => warn!(office = %office.name, address = %office.address, "could not resolve office geocode"),
        }
    }

    Ok(resolved)
}
