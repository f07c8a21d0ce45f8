use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::customers;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = customers)]
pub struct CustomerEntity {
    pub id: Uuid,
    pub phone: i64,
    pub code: i32,
    pub time_zone: Option<String>,
}
