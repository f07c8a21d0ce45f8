use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::messages::InsertMessageEntity, repositories::messages::MessageRepository,
    schema::messages,
};

pub struct MessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MessageRepository for MessagePostgres {
    async fn append(&self, insert_message_entity: InsertMessageEntity) -> Result<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let result = insert_into(messages::table)
                .values(&insert_message_entity)
                .returning(messages::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::postgres_connection::establish_connection;
    use chrono::Utc;
    use domain::value_objects::enums::message_statuses::MessageStatus;

    #[tokio::test]
    #[ignore = "needs a migrated database with a matching mailing and customer row"]
    async fn appends_a_message_row() {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let mailing_id: Uuid = std::env::var("TEST_MAILING_ID")
            .expect("TEST_MAILING_ID must be set")
            .parse()
            .unwrap();
        let customer_id: Uuid = std::env::var("TEST_CUSTOMER_ID")
            .expect("TEST_CUSTOMER_ID must be set")
            .parse()
            .unwrap();

        let pool = Arc::new(establish_connection(&database_url, 2).unwrap());
        let repository = MessagePostgres::new(pool);

        let entity =
            InsertMessageEntity::new(mailing_id, customer_id, Utc::now(), MessageStatus::Delivered);
        let expected = entity.id;

        let id = repository.append(entity).await.unwrap();
        assert_eq!(id, expected);
    }
}
