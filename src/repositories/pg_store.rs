//! PostgreSQL store adapter built on diesel_async and the bb8 pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{DatabaseErrorConverter, StoreResult};
use crate::models::{NewPlanet, NewPlayer, Planet, Player};
use crate::repositories::store::{PlayerStore, PlayerTx};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct PlayerRow {
    id: Uuid,
    username: String,
    created_at: jiff_diesel::Timestamp,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            username: row.username,
            created_at: row.created_at.to_jiff(),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::planets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct PlanetRow {
    id: Uuid,
    player_id: Uuid,
    name: String,
    created_at: jiff_diesel::Timestamp,
    updated_at: jiff_diesel::Timestamp,
}

impl From<PlanetRow> for Planet {
    fn from(row: PlanetRow) -> Self {
        Planet {
            id: row.id,
            player_id: row.player_id,
            name: row.name,
            created_at: row.created_at.to_jiff(),
            updated_at: row.updated_at.to_jiff(),
        }
    }
}

/// Store backed by a PostgreSQL connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct PgPlayerStore {
    pool: AsyncDbPool,
}

impl PgPlayerStore {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerStore for PgPlayerStore {
    async fn list_players(&self) -> StoreResult<Vec<Player>> {
        use crate::schema::players::dsl::*;
        let mut conn = self.pool.get().await?;

        let rows = players
            .select(PlayerRow::as_select())
            .order((created_at.asc(), id.asc()))
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list players"))?;

        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn find_player(&self, player_id: Uuid) -> StoreResult<Option<Player>> {
        use crate::schema::players::dsl::*;
        let mut conn = self.pool.get().await?;

        let row = players
            .filter(id.eq(player_id))
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find player"))?;

        Ok(row.map(Player::from))
    }

    async fn begin(&self) -> StoreResult<Box<dyn PlayerTx>> {
        let mut conn = self.pool.get_owned().await?;

        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "begin transaction"))?;

        Ok(Box::new(PgPlayerTx { conn }))
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "ping"))?;
        Ok(())
    }
}

/// Open transaction holding its pooled connection.
///
/// If dropped mid-transaction the pool sees a broken transaction manager and
/// discards the connection, so the server rolls the work back.
struct PgPlayerTx {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

#[async_trait]
impl PlayerTx for PgPlayerTx {
    async fn insert_player(&mut self, name: &str) -> StoreResult<Player> {
        use crate::schema::players::dsl::*;

        let row = diesel::insert_into(players)
            .values(&NewPlayer { username: name })
            .returning(PlayerRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert player"))?;

        Ok(row.into())
    }

    async fn insert_planet(&mut self, owner: Uuid, planet_name: &str) -> StoreResult<Planet> {
        use crate::schema::planets::dsl::*;

        let row = diesel::insert_into(planets)
            .values(&NewPlanet {
                player_id: owner,
                name: planet_name,
            })
            .returning(PlanetRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert planet"))?;

        Ok(row.into())
    }

    async fn commit(mut self: Box<Self>) -> StoreResult<()> {
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "commit transaction"))
    }

    async fn rollback(mut self: Box<Self>) -> StoreResult<()> {
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "rollback transaction"))
    }
}
