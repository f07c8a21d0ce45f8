use domain::{
    entities::{customers::CustomerEntity, mailings::MailingEntity, messages::InsertMessageEntity},
    repositories::{
        customers::CustomerRepository, delivery_client::DeliveryClient,
        mailings::MailingRepository, messages::MessageRepository,
    },
    value_objects::{
        delivery::DeliveryRequest,
        dispatch::{DispatchSummary, RunResult},
        enums::message_statuses::MessageStatus,
    },
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("mailing {0} not found")]
    MailingNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Fired by the scheduler loop; a mailing whose start moved into the future is skipped.
    Scheduled,
    /// Explicit "send now"; the start date is not checked.
    Immediate,
}

pub struct DispatchMailingUseCase {
    mailing_repository: Arc<dyn MailingRepository + Send + Sync>,
    customer_repository: Arc<dyn CustomerRepository + Send + Sync>,
    message_repository: Arc<dyn MessageRepository + Send + Sync>,
    delivery_client: Arc<dyn DeliveryClient + Send + Sync>,
    clock: Arc<dyn Clock>,
    delivery_timeout: Duration,
    claims: DispatchClaims,
}

impl DispatchMailingUseCase {
    pub fn new(
        mailing_repository: Arc<dyn MailingRepository + Send + Sync>,
        customer_repository: Arc<dyn CustomerRepository + Send + Sync>,
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
        delivery_client: Arc<dyn DeliveryClient + Send + Sync>,
        clock: Arc<dyn Clock>,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            mailing_repository,
            customer_repository,
            message_repository,
            delivery_client,
            clock,
            delivery_timeout,
            claims: DispatchClaims::default(),
        }
    }

    pub async fn dispatch(
        &self,
        mailing_id: Uuid,
        mode: DispatchMode,
    ) -> Result<DispatchSummary, DispatchError> {
        let mailing = self
            .mailing_repository
            .find_by_id(mailing_id)
            .await
            .map_err(|err| {
                error!(
                    %mailing_id,
                    db_error = ?err,
                    "dispatch_mailing: failed to load mailing"
                );
                err
            })?
            .ok_or(DispatchError::MailingNotFound(mailing_id))?;

        if mode == DispatchMode::Scheduled && mailing.starts_after(self.clock.now()) {
            info!(
                %mailing_id,
                start_date = %mailing.start_date,
                "dispatch_mailing: mailing was rescheduled later; skipping"
            );
            return Ok(DispatchSummary::superseded(mailing_id));
        }

        let Some(_claim) = self.claims.try_claim(mailing_id) else {
            warn!(
                %mailing_id,
                "dispatch_mailing: mailing is already being dispatched; skipping"
            );
            return Ok(DispatchSummary::superseded(mailing_id));
        };

        let customers = self
            .customer_repository
            .list_by_filter(mailing.filters)
            .await
            .map_err(|err| {
                error!(
                    %mailing_id,
                    filters = mailing.filters,
                    db_error = ?err,
                    "dispatch_mailing: failed to load customers"
                );
                err
            })?;

        info!(
            %mailing_id,
            customers = customers.len(),
            expiry_date = %mailing.expiry_date,
            "dispatch_mailing: mailing started"
        );

        let summary = self.fan_out(&mailing, &customers).await?;

        info!(
            %mailing_id,
            result = %summary.result,
            attempted = summary.attempted,
            delivered = summary.delivered,
            undelivered = summary.undelivered,
            "dispatch_mailing: mailing finished"
        );

        Ok(summary)
    }

    async fn fan_out(
        &self,
        mailing: &MailingEntity,
        customers: &[CustomerEntity],
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::new(mailing.id);

        for (attempt_id, customer) in customers.iter().enumerate() {
            if mailing.is_expired_at(self.clock.now()) {
                warn!(
                    mailing_id = %mailing.id,
                    attempted = summary.attempted,
                    skipped = customers.len() - summary.attempted,
                    "dispatch_mailing: deadline expired; stopping"
                );
                summary.result = RunResult::DeadlineExpired;
                return Ok(summary);
            }

            let status = self.deliver(mailing, customer, attempt_id as u64).await;
            self.record_outcome(mailing, customer, status).await?;

            summary.attempted += 1;
            match status {
                MessageStatus::Delivered => summary.delivered += 1,
                MessageStatus::Undelivered => summary.undelivered += 1,
            }
        }

        Ok(summary.finish())
    }

    async fn deliver(
        &self,
        mailing: &MailingEntity,
        customer: &CustomerEntity,
        attempt_id: u64,
    ) -> MessageStatus {
        let request = DeliveryRequest {
            attempt_id,
            phone: customer.phone,
            text: mailing.message.clone(),
            timeout: self.delivery_timeout,
        };

        match self.delivery_client.send(request).await {
            Ok(response) if response.is_success() => MessageStatus::Delivered,
            Ok(response) => {
                warn!(
                    mailing_id = %mailing.id,
                    customer_id = %customer.id,
                    status_code = response.status_code,
                    "dispatch_mailing: delivery rejected"
                );
                MessageStatus::Undelivered
            }
            Err(err) => {
                warn!(
                    mailing_id = %mailing.id,
                    customer_id = %customer.id,
                    error = %err,
                    "dispatch_mailing: delivery failed"
                );
                MessageStatus::Undelivered
            }
        }
    }

    async fn record_outcome(
        &self,
        mailing: &MailingEntity,
        customer: &CustomerEntity,
        status: MessageStatus,
    ) -> Result<(), DispatchError> {
        let insert_message_entity =
            InsertMessageEntity::new(mailing.id, customer.id, self.clock.now(), status);

        self.message_repository
            .append(insert_message_entity)
            .await
            .map_err(|err| {
                error!(
                    mailing_id = %mailing.id,
                    customer_id = %customer.id,
                    status = %status,
                    db_error = ?err,
                    "dispatch_mailing: failed to record outcome"
                );
                err
            })?;

        Ok(())
    }
}

/// Mailing ids with a fan-out currently running in this process.
#[derive(Debug, Default)]
struct DispatchClaims {
    in_flight: Mutex<HashSet<Uuid>>,
}

impl DispatchClaims {
    fn try_claim(&self, mailing_id: Uuid) -> Option<DispatchClaim<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(mailing_id) {
            return None;
        }
        Some(DispatchClaim {
            claims: self,
            mailing_id,
        })
    }
}

/// Released on drop, whichever way the dispatch ends.
struct DispatchClaim<'a> {
    claims: &'a DispatchClaims,
    mailing_id: Uuid,
}

impl Drop for DispatchClaim<'_> {
    fn drop(&mut self) {
        self.claims
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.mailing_id);
    }
}
