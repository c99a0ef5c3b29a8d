use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A rentable property; the engine reads its number and yearly price.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::property)]
#[diesel(check_for_backend(Pg))]
pub struct Property {
    pub id: uuid::Uuid,
    pub property_number: String,
    pub name: String,
    pub year_price: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
