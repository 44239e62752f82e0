//! In-process store used by tests and local experiments.
//!
//! Writes are staged on the transaction handle and only become visible on
//! commit. Failure points can be armed to exercise rollback paths, and any
//! operation can be slowed down to exercise request timeouts.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Planet, Player};
use crate::repositories::store::{PlayerStore, PlayerTx};

/// Operations that can be forced to fail or delayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ListPlayers,
    FindPlayer,
    Begin,
    InsertPlayer,
    InsertPlanet,
    Commit,
    Rollback,
    Ping,
}

#[derive(Default)]
struct MemoryState {
    players: Vec<Player>,
    planets: Vec<Planet>,
    fail_points: HashSet<FailPoint>,
    delays: HashMap<FailPoint, Duration>,
    commits: usize,
    rollbacks: usize,
}

impl MemoryState {
    fn check(&self, point: FailPoint) -> StoreResult<()> {
        if self.fail_points.contains(&point) {
            return Err(StoreError::query(
                format!("{:?}", point),
                anyhow::anyhow!("injected failure"),
            ));
        }
        Ok(())
    }

    fn username_taken(&self, username: &str) -> bool {
        self.players.iter().any(|p| p.username == username)
    }
}

fn duplicate_username(username: &str) -> StoreError {
    StoreError::UniqueViolation {
        entity: "players".to_string(),
        field: "username".to_string(),
        value: Some(username.to_string()),
    }
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryPlayerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not wedge the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.lock().fail_points.insert(point);
    }

    pub fn clear_failures(&self) {
        self.lock().fail_points.clear();
    }

    /// Makes `point` sleep for `delay` before it touches any data.
    pub fn delay_on(&self, point: FailPoint, delay: Duration) {
        self.lock().delays.insert(point, delay);
    }

    async fn pause(&self, point: FailPoint) {
        // Guard is released before sleeping
        let delay = self.lock().delays.get(&point).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Committed players, in insertion order.
    pub fn players(&self) -> Vec<Player> {
        self.lock().players.clone()
    }

    /// Committed planets, in insertion order.
    pub fn planets(&self) -> Vec<Planet> {
        self.lock().planets.clone()
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    pub fn rollback_count(&self) -> usize {
        self.lock().rollbacks
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    async fn list_players(&self) -> StoreResult<Vec<Player>> {
        self.pause(FailPoint::ListPlayers).await;
        let state = self.lock();
        state.check(FailPoint::ListPlayers)?;

        let mut players = state.players.clone();
        players.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(players)
    }

    async fn find_player(&self, id: Uuid) -> StoreResult<Option<Player>> {
        self.pause(FailPoint::FindPlayer).await;
        let state = self.lock();
        state.check(FailPoint::FindPlayer)?;
        Ok(state.players.iter().find(|p| p.id == id).cloned())
    }

    async fn begin(&self) -> StoreResult<Box<dyn PlayerTx>> {
        self.pause(FailPoint::Begin).await;
        self.lock().check(FailPoint::Begin)?;
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            players: Vec::new(),
            planets: Vec::new(),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.pause(FailPoint::Ping).await;
        self.lock().check(FailPoint::Ping)
    }
}

struct MemoryTx {
    store: MemoryPlayerStore,
    players: Vec<Player>,
    planets: Vec<Planet>,
}

#[async_trait]
impl PlayerTx for MemoryTx {
    async fn insert_player(&mut self, username: &str) -> StoreResult<Player> {
        self.store.pause(FailPoint::InsertPlayer).await;
        let state = self.store.lock();
        state.check(FailPoint::InsertPlayer)?;

        if state.username_taken(username) || self.players.iter().any(|p| p.username == username) {
            return Err(duplicate_username(username));
        }

        let player = Player {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Timestamp::now(),
        };
        self.players.push(player.clone());
        Ok(player)
    }

    async fn insert_planet(&mut self, player_id: Uuid, name: &str) -> StoreResult<Planet> {
        self.store.pause(FailPoint::InsertPlanet).await;
        let state = self.store.lock();
        state.check(FailPoint::InsertPlanet)?;

        let owner_known = self.players.iter().any(|p| p.id == player_id)
            || state.players.iter().any(|p| p.id == player_id);
        if !owner_known {
            return Err(StoreError::ForeignKeyViolation {
                entity: "planets".to_string(),
                field: "player_id".to_string(),
            });
        }

        let now = Timestamp::now();
        let planet = Planet {
            id: Uuid::new_v4(),
            player_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.planets.push(planet.clone());
        Ok(planet)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx {
            store,
            players,
            planets,
        } = *self;
        store.pause(FailPoint::Commit).await;
        let mut state = store.lock();
        state.check(FailPoint::Commit)?;

        // Another transaction may have claimed the name since insert
        if let Some(conflict) = players.iter().find(|p| state.username_taken(&p.username)) {
            return Err(duplicate_username(&conflict.username));
        }

        state.players.extend(players);
        state.planets.extend(planets);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.store.pause(FailPoint::Rollback).await;
        let mut state = self.store.lock();
        state.check(FailPoint::Rollback)?;
        state.rollbacks += 1;
        Ok(())
    }
}
