use domain::{repositories::mailings::MailingRepository, value_objects::dispatch::DispatchSummary};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    clock::Clock,
    usecases::{
        dispatch_mailing::{DispatchError, DispatchMailingUseCase, DispatchMode},
        queue_version::{QueueGeneration, QueueVersionRegister},
        versioned_wait::{WaitOutcome, wait_until},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRunOutcome {
    /// Every listed mailing was waited for and handed to the dispatcher.
    Exhausted { dispatched: usize },
    /// A newer run took over; the rest of the queue belongs to it.
    Superseded { dispatched: usize },
}

pub struct MailingSchedulerUseCase {
    mailing_repository: Arc<dyn MailingRepository + Send + Sync>,
    dispatcher: Arc<DispatchMailingUseCase>,
    register: Arc<QueueVersionRegister>,
    clock: Arc<dyn Clock>,
    waiting_time_cap: Duration,
}

impl MailingSchedulerUseCase {
    pub fn new(
        mailing_repository: Arc<dyn MailingRepository + Send + Sync>,
        dispatcher: Arc<DispatchMailingUseCase>,
        register: Arc<QueueVersionRegister>,
        clock: Arc<dyn Clock>,
        waiting_time_cap: Duration,
    ) -> Self {
        Self {
            mailing_repository,
            dispatcher,
            register,
            clock,
            waiting_time_cap,
        }
    }

    /// Publishes a new generation and runs the queue for it in the background.
    ///
    /// Any older run still waiting for a start time gives up once it sees the
    /// new generation. Returns without waiting for the run.
    pub fn trigger_rescheduling(self: &Arc<Self>) -> QueueGeneration {
        let generation = self.begin_generation();
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            match scheduler.run_queue(generation).await {
                Ok(outcome) => info!(
                    generation = generation.seq(),
                    ?outcome,
                    "mailing_scheduler: queue run ended"
                ),
                Err(err) => error!(
                    generation = generation.seq(),
                    error = %err,
                    "mailing_scheduler: queue run aborted"
                ),
            }
        });

        generation
    }

    pub fn begin_generation(&self) -> QueueGeneration {
        let generation = self.register.issue(self.clock.now());
        self.register.publish(generation);

        info!(
            generation = generation.seq(),
            captured_at = %generation.captured_at(),
            "mailing_scheduler: queue generation published"
        );

        generation
    }

    pub async fn run_queue(
        &self,
        generation: QueueGeneration,
    ) -> Result<QueueRunOutcome, DispatchError> {
        let mailings = self
            .mailing_repository
            .list_due(generation.captured_at())
            .await
            .map_err(|err| {
                error!(
                    generation = generation.seq(),
                    db_error = ?err,
                    "mailing_scheduler: failed to list due mailings"
                );
                err
            })?;

        info!(
            generation = generation.seq(),
            queued = mailings.len(),
            "mailing_scheduler: queue snapshot taken"
        );

        let mut dispatched = 0;
        for mailing in mailings {
            let outcome = wait_until(
                &self.register,
                self.clock.as_ref(),
                mailing.start_date,
                generation,
                self.waiting_time_cap,
            )
            .await;

            if outcome == WaitOutcome::Superseded {
                info!(
                    generation = generation.seq(),
                    current = self.register.current(),
                    mailing_id = %mailing.id,
                    "mailing_scheduler: superseded by a newer queue run"
                );
                return Ok(QueueRunOutcome::Superseded { dispatched });
            }

            match self
                .dispatcher
                .dispatch(mailing.id, DispatchMode::Scheduled)
                .await
            {
                Ok(summary) => {
                    dispatched += 1;
                    info!(
                        generation = generation.seq(),
                        mailing_id = %mailing.id,
                        result = %summary.result,
                        "mailing_scheduler: mailing dispatched"
                    );
                }
                Err(DispatchError::MailingNotFound(mailing_id)) => {
                    warn!(
                        generation = generation.seq(),
                        %mailing_id,
                        "mailing_scheduler: mailing disappeared before dispatch; skipping"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(QueueRunOutcome::Exhausted { dispatched })
    }

    /// Fans a mailing out right away, without waiting for its start date.
    ///
    /// Publishes a new queue generation first, like any other change to a
    /// mailing's schedule. The fan-out itself runs on its own task, so dropping
    /// the returned future never leaves a sent message without a ledger row.
    pub async fn dispatch_now(
        self: &Arc<Self>,
        mailing_id: Uuid,
    ) -> Result<DispatchSummary, DispatchError> {
        let generation = self.trigger_rescheduling();
        info!(
            %mailing_id,
            generation = generation.seq(),
            "mailing_scheduler: immediate dispatch requested"
        );

        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher
                .dispatch(mailing_id, DispatchMode::Immediate)
                .await
        })
        .await
        .map_err(|err| {
            error!(
                %mailing_id,
                error = %err,
                "mailing_scheduler: immediate dispatch task failed"
            );
            DispatchError::Store(anyhow::Error::new(err))
        })?
    }
}
