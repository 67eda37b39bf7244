use super::{Transport, ZendeskClient};
use crate::error::Result;
use crate::models::{BulkResponse, JobStatus, TicketId};
use reqwest::Method;
use std::io::Write;
use tracing::{debug, instrument};

/// Largest id list the bulk endpoints accept in one request.
pub const BULK_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    MarkSpam,
    Delete,
}

impl BulkOperation {
    pub fn method(self) -> Method {
        match self {
            BulkOperation::MarkSpam => Method::PUT,
            BulkOperation::Delete => Method::DELETE,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            BulkOperation::MarkSpam => "tickets/mark_many_as_spam.json",
            BulkOperation::Delete => "tickets/destroy_many.json",
        }
    }
}

/// Split ids into consecutive runs of at most `BULK_CHUNK_SIZE`, in order.
pub fn chunk_ids(ids: &[TicketId]) -> impl Iterator<Item = &[TicketId]> {
    ids.chunks(BULK_CHUNK_SIZE)
}

fn join_ids(chunk: &[TicketId]) -> String {
    chunk
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl<T: Transport> ZendeskClient<T> {
    /// Submit one bulk request per chunk of ids, writing each job status URL
    /// to `out`. Stops at the first failed chunk; earlier chunks stay applied.
    #[instrument(skip(self, ids, out))]
    pub async fn bulk_operation<I, W>(
        &self,
        operation: BulkOperation,
        ids: I,
        out: &mut W,
    ) -> Result<Vec<JobStatus>>
    where
        I: IntoIterator<Item = TicketId>,
        W: Write,
    {
        let ids: Vec<TicketId> = ids.into_iter().collect();
        let url = self.endpoint(operation.path())?;
        let mut jobs = Vec::with_capacity(ids.len().div_ceil(BULK_CHUNK_SIZE));

        for (index, chunk) in chunk_ids(&ids).enumerate() {
            debug!(chunk = index, size = chunk.len(), "Submitting bulk request");
            let ids_param = join_ids(chunk);
            let resp: BulkResponse = self
                .request(operation.method(), url.clone(), &[("ids", ids_param.as_str())])
                .await?;

            writeln!(out, "{}", resp.job_status.url)?;
            jobs.push(resp.job_status);
        }

        Ok(jobs)
    }

    pub async fn mark_many_as_spam<I, W>(&self, ids: I, out: &mut W) -> Result<Vec<JobStatus>>
    where
        I: IntoIterator<Item = TicketId>,
        W: Write,
    {
        self.bulk_operation(BulkOperation::MarkSpam, ids, out).await
    }

    pub async fn destroy_many<I, W>(&self, ids: I, out: &mut W) -> Result<Vec<JobStatus>>
    where
        I: IntoIterator<Item = TicketId>,
        W: Write,
    {
        self.bulk_operation(BulkOperation::Delete, ids, out).await
    }
}
