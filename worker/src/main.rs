use anyhow::Result;
use application::{
    clock::{Clock, SystemClock},
    usecases::{
        dispatch_mailing::DispatchMailingUseCase, mailing_scheduler::MailingSchedulerUseCase,
        queue_version::QueueVersionRegister,
    },
};
use domain::repositories::{
    customers::CustomerRepository, delivery_client::DeliveryClient, mailings::MailingRepository,
    messages::MessageRepository,
};
use infra::{
    delivery::http_delivery_client::HttpDeliveryClient,
    postgres::{
        postgres_connection,
        repositories::{
            customers::CustomerPostgres, mailings::MailingPostgres, messages::MessagePostgres,
        },
    },
};
use std::sync::Arc;
use tracing::{error, info};
use worker::{axum_http, config};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    infra::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.pool_max_size,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let mailing_repository: Arc<dyn MailingRepository + Send + Sync> =
        Arc::new(MailingPostgres::new(Arc::clone(&db_pool_arc)));
    let customer_repository: Arc<dyn CustomerRepository + Send + Sync> =
        Arc::new(CustomerPostgres::new(Arc::clone(&db_pool_arc)));
    let message_repository: Arc<dyn MessageRepository + Send + Sync> =
        Arc::new(MessagePostgres::new(Arc::clone(&db_pool_arc)));

    let delivery_client: Arc<dyn DeliveryClient + Send + Sync> = Arc::new(
        HttpDeliveryClient::new(
            dotenvy_env.mailing_api.url.clone(),
            dotenvy_env.mailing_api.token.clone(),
        )?,
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let dispatcher = Arc::new(DispatchMailingUseCase::new(
        Arc::clone(&mailing_repository),
        customer_repository,
        message_repository,
        delivery_client,
        Arc::clone(&clock),
        dotenvy_env.mailing_api.timeout,
    ));

    let scheduler = Arc::new(MailingSchedulerUseCase::new(
        mailing_repository,
        dispatcher,
        Arc::new(QueueVersionRegister::new()),
        clock,
        dotenvy_env.dispatch.waiting_time_cap,
    ));

    // Build the queue once; later runs are triggered over HTTP.
    let generation = scheduler.trigger_rescheduling();
    info!(generation = generation.seq(), "Initial mailing queue scheduled");

    let server_config = Arc::clone(&dotenvy_env);
    let internal_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, scheduler).await });

    internal_server.await??;
    Ok(())
}
