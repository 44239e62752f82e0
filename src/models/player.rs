use diesel::prelude::*;
use jiff::Timestamp;
use uuid::Uuid;

/// A registered player.
///
/// Players are immutable once created; the only write path is the
/// player-with-planet transaction in the repository layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub created_at: Timestamp,
}

/// NewPlayer model for inserting new records
/// Derives Insertable for INSERT operations
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::players)]
pub struct NewPlayer<'a> {
    pub username: &'a str,
}
