use crate::models::{Ticket, TicketId};
use crate::zendesk::{BulkOperation, Transport, ZendeskClient};
use anyhow::Context;
use std::io::Write;
use tracing::{debug, info};

/// Ids collected before they are handed to the bulk endpoint.
pub const FLUSH_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Summary,
    Full,
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub query: String,
    pub operation: Option<BulkOperation>,
    pub format: OutputFormat,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct QueryReport {
    pub tickets: usize,
    pub pages: usize,
    pub jobs: usize,
}

fn print_ticket<W: Write>(ticket: &Ticket, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Summary => writeln!(out, "{}", ticket.summary_line())?,
        OutputFormat::Full => writeln!(out, "{}", serde_json::to_string_pretty(ticket)?)?,
    }
    Ok(())
}

async fn flush<T: Transport, W: Write>(
    client: &ZendeskClient<T>,
    operation: Option<BulkOperation>,
    pending: &mut Vec<TicketId>,
    out: &mut W,
) -> anyhow::Result<usize> {
    let ids = std::mem::take(pending);
    let Some(operation) = operation else {
        return Ok(0);
    };

    debug!(?operation, count = ids.len(), "Flushing ticket ids");
    let jobs = match operation {
        BulkOperation::MarkSpam => client.mark_many_as_spam(ids, out).await,
        BulkOperation::Delete => client.destroy_many(ids, out).await,
    }
    .with_context(|| format!("{:?} request failed", operation))?;
    Ok(jobs.len())
}

/// Print every ticket matching the query and, if an operation was chosen,
/// apply it to them in batches as they stream in.
pub async fn query_tickets<T: Transport, W: Write>(
    client: &ZendeskClient<T>,
    options: &QueryOptions,
    out: &mut W,
) -> anyhow::Result<QueryReport> {
    let mut pager = client.query(&options.query)?;
    let mut pending: Vec<TicketId> = Vec::with_capacity(FLUSH_THRESHOLD);
    let mut report = QueryReport::default();

    while let Some(ticket) = pager.next_ticket().await.context("Search request failed")? {
        print_ticket(&ticket, options.format, out)?;
        report.tickets += 1;

        pending.push(ticket.id);
        if pending.len() >= FLUSH_THRESHOLD {
            report.jobs += flush(client, options.operation, &mut pending, out).await?;
        }
    }

    if !pending.is_empty() {
        report.jobs += flush(client, options.operation, &mut pending, out).await?;
    }

    report.pages = pager.pages_fetched();
    info!(
        tickets = report.tickets,
        pages = report.pages,
        jobs = report.jobs,
        "Query finished"
    );
    Ok(report)
}
