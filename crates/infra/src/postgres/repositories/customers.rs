use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::task;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::customers::CustomerEntity, repositories::customers::CustomerRepository,
    schema::customers,
};

pub struct CustomerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CustomerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CustomerRepository for CustomerPostgres {
    async fn list_by_filter(&self, code: i32) -> Result<Vec<CustomerEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<CustomerEntity>> {
            let mut conn = db_pool.get()?;

            // Attempt ids are positional, so the order has to be stable between runs.
            let results = customers::table
                .filter(customers::code.eq(code))
                .order(customers::id.asc())
                .select(CustomerEntity::as_select())
                .load::<CustomerEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }
}
