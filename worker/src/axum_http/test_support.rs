use application::{
    clock::{Clock, SystemClock},
    usecases::{
        dispatch_mailing::DispatchMailingUseCase, mailing_scheduler::MailingSchedulerUseCase,
        queue_version::QueueVersionRegister,
    },
};
use chrono::{Duration as ChronoDuration, Utc};
use domain::{
    entities::{customers::CustomerEntity, mailings::MailingEntity, messages::InsertMessageEntity},
    repositories::{
        customers::MockCustomerRepository, delivery_client::MockDeliveryClient,
        mailings::MockMailingRepository, messages::MockMessageRepository,
    },
    value_objects::delivery::DeliveryResponse,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use uuid::Uuid;

/// Mailing that started five minutes ago and expires `expiry_offset` from now.
pub(crate) fn sample_mailing(expiry_offset: ChronoDuration) -> MailingEntity {
    let now = Utc::now();
    MailingEntity {
        id: Uuid::new_v4(),
        start_date: now - ChronoDuration::minutes(5),
        expiry_date: now + expiry_offset,
        message: "Hello, World!".to_string(),
        filters: 927,
    }
}

pub(crate) struct SchedulerFixture {
    pub(crate) mailings: Vec<MailingEntity>,
    pub(crate) customers: usize,
    pub(crate) delivery_delay: Duration,
    pub(crate) ledger_fails: bool,
}

impl Default for SchedulerFixture {
    fn default() -> Self {
        Self {
            mailings: Vec::new(),
            customers: 1,
            delivery_delay: Duration::ZERO,
            ledger_fails: false,
        }
    }
}

pub(crate) struct Wired {
    pub(crate) scheduler: Arc<MailingSchedulerUseCase>,
    pub(crate) register: Arc<QueueVersionRegister>,
    pub(crate) sent: Arc<AtomicUsize>,
    pub(crate) recorded: Arc<Mutex<Vec<InsertMessageEntity>>>,
}

impl Wired {
    pub(crate) fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub(crate) fn recorded(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }
}

impl SchedulerFixture {
    pub(crate) fn build(self) -> Wired {
        let mut mailing_repository = MockMailingRepository::new();
        let listed = self.mailings.clone();
        mailing_repository.expect_list_due().returning(move |since| {
            let due: Vec<MailingEntity> = listed
                .iter()
                .filter(|m| m.start_date >= since)
                .cloned()
                .collect();
            Box::pin(async move { Ok(due) })
        });
        let mailings = self.mailings;
        mailing_repository
            .expect_find_by_id()
            .returning(move |mailing_id| {
                let found = mailings.iter().find(|m| m.id == mailing_id).cloned();
                Box::pin(async move { Ok(found) })
            });
        let mailing_repository = Arc::new(mailing_repository);

        let customers = self.customers;
        let mut customer_repository = MockCustomerRepository::new();
        customer_repository
            .expect_list_by_filter()
            .returning(move |code| {
                let matching = (0..customers)
                    .map(|i| CustomerEntity {
                        id: Uuid::new_v4(),
                        phone: 79270000000 + i as i64,
                        code,
                        time_zone: None,
                    })
                    .collect();
                Box::pin(async move { Ok(matching) })
            });

        let recorded = Arc::new(Mutex::new(Vec::new()));
        let ledger_fails = self.ledger_fails;
        let sink = Arc::clone(&recorded);
        let mut ledger = MockMessageRepository::new();
        ledger.expect_append().returning(move |entity| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                if ledger_fails {
                    return Err(anyhow::anyhow!("connection reset by peer"));
                }
                let id = entity.id;
                sink.lock().unwrap().push(entity);
                Ok(id)
            })
        });

        let sent = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&sent);
        let delivery_delay = self.delivery_delay;
        let mut delivery_client = MockDeliveryClient::new();
        delivery_client.expect_send().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if !delivery_delay.is_zero() {
                    tokio::time::sleep(delivery_delay).await;
                }
                Ok(DeliveryResponse {
                    status_code: 200,
                    body: String::new(),
                })
            })
        });

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let dispatcher = Arc::new(DispatchMailingUseCase::new(
            mailing_repository.clone(),
            Arc::new(customer_repository),
            Arc::new(ledger),
            Arc::new(delivery_client),
            Arc::clone(&clock),
            Duration::from_secs(20),
        ));

        let register = Arc::new(QueueVersionRegister::new());
        let scheduler = Arc::new(MailingSchedulerUseCase::new(
            mailing_repository,
            dispatcher,
            Arc::clone(&register),
            clock,
            Duration::from_secs(5),
        ));

        Wired {
            scheduler,
            register,
            sent,
            recorded,
        }
    }
}
