//! Tour generation workflow.
//!
//! A finite state machine exposed to the hosting UI:
//! `Idle → Validating → Submitting → (Success | Failed) → Idle` (on reset).
//!
//! While a generation call is in flight, a cosmetic progress ticker
//! advances a step counter on a fixed interval. The ticker carries no
//! correctness semantics — it exists for perceived responsiveness and is
//! cancelled on every exit from `Submitting`, success or failure, so no
//! timer leaks into a later run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    client::Client,
    tours::validate_request,
    types::{GeneratedTour, ResolvedGuides, TourRequest},
};

/// Captions for the progress steps shown during generation.
pub const PROGRESS_STEPS: [&str; 5] = [
    "Analyzing your preferences",
    "Scouting the destination",
    "Curating stops",
    "Balancing the schedule",
    "Finalizing your tour",
];

/// Step counter value meaning "generation complete".
pub const STEP_COMPLETE: usize = PROGRESS_STEPS.len();

const TICK_INTERVAL: Duration = Duration::from_millis(1200);

/// Workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing in progress.
    Idle,
    /// Local validation running.
    Validating,
    /// Generation call in flight; the ticker is live.
    Submitting,
    /// The last submission produced a tour.
    Success,
    /// The last submission failed.
    Failed {
        /// User-facing message (validation or network/server error).
        message: String,
    },
}

/// Drives a generation call and the guide resolution that follows it.
#[derive(Debug)]
pub struct GenerationWorkflow {
    client: Client,
    state: WorkflowState,
    last_tour: Option<GeneratedTour>,
    step: Arc<watch::Sender<usize>>,
}

impl GenerationWorkflow {
    /// Create an idle workflow over a client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        let (step, _) = watch::channel(0);
        Self {
            client,
            state: WorkflowState::Idle,
            last_tour: None,
            step: Arc::new(step),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// The most recent successfully generated tour, if any.
    ///
    /// A failed regeneration leaves this untouched.
    #[must_use]
    pub fn last_tour(&self) -> Option<&GeneratedTour> {
        self.last_tour.as_ref()
    }

    /// Subscribe to the progress step counter. Values run `0..=STEP_COMPLETE`;
    /// the ticker itself never reaches `STEP_COMPLETE`.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<usize> {
        self.step.subscribe()
    }

    /// Current progress step.
    #[must_use]
    pub fn current_step(&self) -> usize {
        *self.step.borrow()
    }

    /// Submit a generation request.
    ///
    /// Validation errors go straight to `Failed` without a network call.
    /// With `save_to_account`, the authenticated endpoint is used (failing
    /// fast when no token is stored); otherwise the sample endpoint.
    pub async fn submit(&mut self, request: &TourRequest, save_to_account: bool) -> &WorkflowState {
        let submission_id = Uuid::new_v4().to_string();
        tracing::info!(
            submission_id = %submission_id,
            destination = %request.destination,
            save_to_account,
            "Submitting generation request"
        );

        self.state = WorkflowState::Validating;
        let errors = validate_request(request);
        if !errors.is_empty() {
            tracing::info!(
                submission_id = %submission_id,
                error_count = errors.len(),
                "Submission rejected by validation"
            );
            self.step.send_replace(0);
            self.state = WorkflowState::Failed {
                message: errors.join("; "),
            };
            return &self.state;
        }

        self.state = WorkflowState::Submitting;
        self.step.send_replace(0);
        let cancel = CancellationToken::new();
        let ticker = spawn_ticker(Arc::clone(&self.step), cancel.clone());

        let tours = self.client.tours();
        let result = if save_to_account {
            tours.generate(request).await
        } else {
            tours.generate_sample(request).await
        };

        cancel.cancel();
        let _ = ticker.await;

        match result {
            Ok(tour) => {
                tracing::info!(
                    submission_id = %submission_id,
                    tour_id = %tour.id,
                    destination = %tour.destination,
                    "Generation succeeded"
                );
                self.step.send_replace(STEP_COMPLETE);
                self.last_tour = Some(tour);
                self.state = WorkflowState::Success;
            }
            Err(err) => {
                tracing::warn!(submission_id = %submission_id, error = %err, "Generation failed");
                self.step.send_replace(0);
                self.state = WorkflowState::Failed {
                    message: err.user_message(),
                };
            }
        }
        &self.state
    }

    /// Resolve guides for the last generated tour.
    ///
    /// Returns `None` when there is no tour to match against. The underlying
    /// resolution is memoized per tour, so toggling a guide panel repeatedly
    /// costs at most one network round.
    pub async fn toggle_guides(&self) -> Option<ResolvedGuides> {
        let tour = self.last_tour.as_ref()?;
        Some(self.client.guides().resolve_for_tour(tour).await)
    }

    /// Start over: clear the last tour, error state, progress counter and
    /// the memoized guide set, returning to `Idle`.
    pub fn reset(&mut self) {
        self.state = WorkflowState::Idle;
        self.last_tour = None;
        self.step.send_replace(0);
        self.client.clear_guide_cache();
    }
}

fn spawn_ticker(
    step: Arc<watch::Sender<usize>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(TICK_INTERVAL) => {
                    // Cap below the final step; only a real success completes.
                    step.send_modify(|s| *s = (*s + 1).min(PROGRESS_STEPS.len() - 1));
                }
            }
        }
    })
}
