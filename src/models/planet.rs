use diesel::prelude::*;
use jiff::Timestamp;
use uuid::Uuid;

/// A planet owned by exactly one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planet {
    pub id: Uuid,
    pub player_id: Uuid,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// NewPlanet model for inserting new records
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::planets)]
pub struct NewPlanet<'a> {
    pub player_id: Uuid,
    pub name: &'a str,
}
