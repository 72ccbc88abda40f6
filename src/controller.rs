use anyhow::Result;
use chrono::{DateTime, Local};

use crate::api::JobSource;
use crate::models::{JobDetails, JobPayload, SimilarJob};
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Names one issued request. Only the ticket from the most recent `load`
/// can move the controller out of `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    generation: u64,
}

#[derive(Debug)]
pub struct DetailController {
    state: FetchState,
    current_id: Option<String>,
    generation: u64,
    job: Option<JobDetails>,
    similar_jobs: Vec<SimilarJob>,
    fetched_at: Option<DateTime<Local>>,
}

impl Default for DetailController {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailController {
    pub fn new() -> Self {
        Self {
            state: FetchState::Idle,
            current_id: None,
            generation: 0,
            job: None,
            similar_jobs: Vec::new(),
            fetched_at: None,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn job(&self) -> Option<&JobDetails> {
        self.job.as_ref()
    }

    pub fn similar_jobs(&self) -> &[SimilarJob] {
        &self.similar_jobs
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    pub fn load(&mut self, id: &str) -> Ticket {
        self.generation += 1;
        self.state = FetchState::Loading;
        self.current_id = Some(id.to_string());
        self.clear_records();

        Ticket {
            id: id.to_string(),
            generation: self.generation,
        }
    }

    /// Reloads the last identifier. Only offered while the failure view is up.
    pub fn retry(&mut self) -> Option<Ticket> {
        if !matches!(self.view(), View::Failure) {
            return None;
        }
        let id = self.current_id.clone()?;
        Some(self.load(&id))
    }

    /// Loads `id` if it differs from the current identifier.
    pub fn navigate(&mut self, id: &str) -> Option<Ticket> {
        if self.current_id.as_deref() == Some(id) {
            return None;
        }
        Some(self.load(id))
    }

    /// Applies a request outcome. Returns false when the ticket was superseded.
    pub fn complete(&mut self, ticket: &Ticket, outcome: Result<JobPayload>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(job_id = %ticket.id, "Discarding outcome of superseded request");
            return false;
        }

        match outcome {
            Ok(payload) => {
                self.job = Some(payload.job);
                self.similar_jobs = payload.similar_jobs;
                self.fetched_at = Some(Local::now());
                self.state = FetchState::Ready;
            }
            Err(e) => {
                tracing::warn!(job_id = %ticket.id, error = %format!("{:#}", e), "Failed to fetch job details");
                self.clear_records();
                self.state = FetchState::Failed;
            }
        }
        true
    }

    pub fn view(&self) -> View<'_> {
        match self.state {
            FetchState::Idle => View::Empty,
            FetchState::Loading => View::Loading,
            FetchState::Failed => View::Failure,
            FetchState::Ready => match &self.job {
                Some(job) if job.title.as_deref().is_some_and(|t| !t.is_empty()) => View::Detail {
                    job,
                    similar_jobs: &self.similar_jobs,
                },
                _ => View::Failure,
            },
        }
    }

    fn clear_records(&mut self) {
        self.job = None;
        self.similar_jobs.clear();
        self.fetched_at = None;
    }
}

/// Loads `id`, waits for `source`, and applies the outcome.
pub async fn fetch_into<S: JobSource>(controller: &mut DetailController, source: &S, id: &str) {
    let ticket = controller.load(id);
    let outcome = source.fetch_job(&ticket.id).await;
    controller.complete(&ticket, outcome);
}
