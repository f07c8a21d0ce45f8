use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::mailings::MailingEntity, repositories::mailings::MailingRepository,
    schema::mailings,
};

pub struct MailingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MailingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MailingRepository for MailingPostgres {
    async fn list_due(&self, since: DateTime<Utc>) -> Result<Vec<MailingEntity>> {
        // Diesel is synchronous; keep pool checkout and the query off the async workers.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<MailingEntity>> {
            let mut conn = db_pool.get()?;

            let results = mailings::table
                .filter(mailings::start_date.ge(since))
                .order((mailings::start_date.asc(), mailings::id.asc()))
                .select(MailingEntity::as_select())
                .load::<MailingEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn find_by_id(&self, mailing_id: Uuid) -> Result<Option<MailingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<MailingEntity>> {
            let mut conn = db_pool.get()?;

            let result = mailings::table
                .find(mailing_id)
                .select(MailingEntity::as_select())
                .first::<MailingEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::postgres_connection::establish_connection;
    use chrono::{Duration, SubsecRound};
    use diesel::{delete, insert_into};

    #[tokio::test]
    #[ignore = "needs a migrated database"]
    async fn list_due_orders_by_start_date_and_skips_earlier_mailings() {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = Arc::new(establish_connection(&database_url, 2).unwrap());

        let base = (Utc::now() + Duration::days(36500)).trunc_subsecs(0);
        let offsets = [30, -10, 10, 0, 20];
        let ids: Vec<Uuid> = offsets.iter().map(|_| Uuid::new_v4()).collect();

        {
            let mut conn = pool.get().unwrap();
            for (id, offset) in ids.iter().zip(offsets) {
                let start_date = base + Duration::minutes(offset);
                insert_into(mailings::table)
                    .values((
                        mailings::id.eq(*id),
                        mailings::start_date.eq(start_date),
                        mailings::expiry_date.eq(start_date + Duration::hours(1)),
                        mailings::message.eq("Hello, World!"),
                        mailings::filters.eq(927),
                    ))
                    .execute(&mut conn)
                    .unwrap();
            }
        }

        let repository = MailingPostgres::new(Arc::clone(&pool));
        let listed = repository.list_due(base).await;

        {
            let mut conn = pool.get().unwrap();
            delete(mailings::table.filter(mailings::id.eq_any(&ids)))
                .execute(&mut conn)
                .unwrap();
        }

        let listed: Vec<MailingEntity> = listed
            .unwrap()
            .into_iter()
            .filter(|m| ids.contains(&m.id))
            .collect();
        let minutes: Vec<i64> = listed
            .iter()
            .map(|m| (m.start_date - base).num_minutes())
            .collect();

        assert_eq!(minutes, vec![0, 10, 20, 30]);
    }
}
