//! Job submission and polling

use async_stream::stream;
use openpixels_core::domain::job::{JobOutcome, StatusUpdate};
use openpixels_core::dto::job::SubmitResponse;
use serde::Serialize;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::JobClient;
use crate::error::{ClientError, Result, SubmissionError, TransportError};
use crate::transport::{Transport, TransportRequest};

const SUBMIT_PATH: &str = "/submit";

/// Response header naming the worker instance that accepted a job
pub const MACHINE_ID_HEADER: &str = "machine-id";

/// Request header pinning a poll to a worker instance
pub const ROUTING_HEADER: &str = "fly-force-instance-id";

/// A job accepted by the worker
///
/// Workers keep job state in memory and do not share it, so every poll for
/// this job has to reach the instance named by `machine_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub id: String,
    pub machine_id: Option<String>,
}

impl<T: Transport> JobClient<T> {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a job
    ///
    /// # Arguments
    /// * `payload` - The job specification, sent verbatim as the JSON body
    ///
    /// # Returns
    /// The job id together with the worker instance holding the job
    ///
    /// # Errors
    /// [`ClientError::Submission`] when the worker answers with an error
    /// status or without a job id. Submissions are never retried.
    pub async fn submit<P>(&self, payload: &P) -> Result<SubmittedJob>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_value(payload)?;
        let response = self
            .transport
            .send(TransportRequest::post(SUBMIT_PATH, body))
            .await?;

        if !response.is_success() {
            return Err(SubmissionError::Rejected {
                status: response.status.as_u16(),
                body: response.body,
            }
            .into());
        }

        let machine_id = response.header(MACHINE_ID_HEADER).map(str::to_string);
        // A 2xx body that does not carry a usable id is a failed submission,
        // whatever its shape.
        let id = match response.json::<SubmitResponse>() {
            Ok(submitted) => submitted.job_id(),
            Err(e) => {
                debug!("Unreadable /submit body: {}", e);
                None
            }
        }
        .ok_or(SubmissionError::MissingJobId)?;

        match &machine_id {
            Some(machine_id) => info!("Submitted job {} (machine {})", id, machine_id),
            None => warn!(
                "Submitted job {} but the worker sent no {} header, polls will not be pinned",
                id, MACHINE_ID_HEADER
            ),
        }

        Ok(SubmittedJob { id, machine_id })
    }

    /// Follow a submitted job
    ///
    /// Long-polls the worker and yields every update it reports. The stream
    /// ends right after the terminal (`"result"`) update. Each call starts a
    /// fresh polling loop; dropping the stream cancels the request in flight.
    ///
    /// Poll timeouts are retried immediately and yield nothing (bounded by
    /// [`ClientConfig::max_poll_timeouts`](crate::ClientConfig)). A poll that
    /// answers with an error status ends the stream without yielding, unless
    /// [`ClientConfig::surface_poll_errors`](crate::ClientConfig) is set.
    /// Any other failure is yielded as the last item.
    pub fn subscribe<'a>(
        &'a self,
        job: &'a SubmittedJob,
    ) -> impl Stream<Item = Result<StatusUpdate>> + Send + 'a {
        stream! {
            let path = format!("/poll/{}", job.id);
            let mut timeouts: u32 = 0;

            loop {
                let mut request = TransportRequest::get(path.as_str()).timeout(self.config.poll_timeout);
                if let Some(machine_id) = &job.machine_id {
                    request = request.header(ROUTING_HEADER, machine_id.as_str());
                }

                let response = match self.transport.send(request).await {
                    Ok(response) => response,
                    Err(TransportError::Timeout) => {
                        timeouts += 1;
                        debug!("Poll for job {} timed out ({} in a row), polling again", job.id, timeouts);

                        if self.config.max_poll_timeouts.is_some_and(|limit| timeouts > limit) {
                            yield Err(ClientError::PollTimedOut {
                                job_id: job.id.clone(),
                                attempts: timeouts,
                            });
                            break;
                        }
                        continue;
                    }
                    Err(e) => {
                        yield Err(e.into());
                        break;
                    }
                };
                timeouts = 0;

                if !response.is_success() {
                    let status = response.status.as_u16();
                    if self.config.surface_poll_errors {
                        yield Err(ClientError::PollFailed {
                            job_id: job.id.clone(),
                            status,
                            body: response.body,
                        });
                    } else {
                        // The worker may still be running the job; there is
                        // no way to tell from here.
                        warn!(
                            "Stopped polling job {}: worker answered {}: {}",
                            job.id, status, response.body
                        );
                    }
                    break;
                }

                let update = match response.json::<StatusUpdate>() {
                    Ok(update) => update,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };

                let terminal = update.is_terminal();
                yield Ok(update);

                if terminal {
                    debug!("Job {} reached its result", job.id);
                    break;
                }
            }
        }
    }

    /// Submit a job and wait for its outcome
    ///
    /// # Arguments
    /// * `payload` - The job specification
    ///
    /// # Returns
    /// The outcome built from the terminal update, or `None` when polling
    /// stopped before the worker reported one. Callers should treat `None`
    /// as a failed job.
    ///
    /// # Example
    /// ```no_run
    /// # use openpixels_client::JobClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = JobClient::new("sk-my-key")?;
    /// let outcome = client
    ///     .run(&serde_json::json!({"model": "flux-schnell", "prompt": "a blue square"}))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<P>(&self, payload: &P) -> Result<Option<JobOutcome>>
    where
        P: Serialize + ?Sized,
    {
        let job = self.submit(payload).await?;

        let updates = self.subscribe(&job);
        tokio::pin!(updates);

        while let Some(update) = updates.next().await {
            let update = update?;
            if update.is_terminal() {
                let outcome = JobOutcome::from(update);
                info!(
                    "Job {} finished with status {}",
                    job.id,
                    outcome.status.as_ref().unwrap_or(&serde_json::Value::Null)
                );
                return Ok(Some(outcome));
            }

            debug!(
                "Job {}: {} {}",
                job.id,
                update.kind,
                update.status.as_ref().unwrap_or(&serde_json::Value::Null)
            );
        }

        warn!("Polling job {} ended without a result", job.id);
        Ok(None)
    }
}
