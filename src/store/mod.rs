//! The document store the league is kept in.
//!
//! A store holds three collections and offers four operations on them
//! (snapshot, add, update, delete) plus a change feed. Everything above this
//! module talks to the [`Store`] trait; [`sqlite::SqliteStore`] is the
//! implementation used by the server.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    league::{
        Match, NewMatch, NewPlayer, NewTeam, Player, Team,
        score::{Score, ScoreError},
    },
    msg::Msg,
};

pub mod sqlite;
pub mod subscription;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Teams,
    Players,
    Matches,
}

impl Collection {
    pub const ALL: [Collection; 3] =
        [Collection::Teams, Collection::Players, Collection::Matches];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Teams => "teams",
            Collection::Players => "players",
            Collection::Matches => "matches",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The full contents of one collection at a point in time.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Teams(Vec<Team>),
    Players(Vec<Player>),
    Matches(Vec<Match>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Snapshot::Teams(_) => Collection::Teams,
            Snapshot::Players(_) => Collection::Players,
            Snapshot::Matches(_) => Collection::Matches,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Snapshot::Teams(teams) => teams.len(),
            Snapshot::Players(players) => players.len(),
            Snapshot::Matches(matches) => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub enum NewDocument {
    Team(NewTeam),
    Player(NewPlayer),
    Match(NewMatch),
}

impl NewDocument {
    pub fn collection(&self) -> Collection {
        match self {
            NewDocument::Team(_) => Collection::Teams,
            NewDocument::Player(_) => Collection::Players,
            NewDocument::Match(_) => Collection::Matches,
        }
    }
}

/// The fields of an existing document which may be changed.
#[derive(Clone, Debug)]
pub enum FieldUpdate {
    /// Sets (or, with `None`, clears) the score of a match.
    MatchScore(Option<Score>),
}

impl FieldUpdate {
    pub fn collection(&self) -> Collection {
        match self {
            FieldUpdate::MatchScore(_) => Collection::Matches,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("could not obtain a database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("failed to run migrations: {0}")]
    Migration(String),
    #[error("no document {id} in {collection}")]
    NotFound { collection: Collection, id: String },
    #[error("match {id} has a malformed stored score: {source}")]
    CorruptScore {
        id: String,
        #[source]
        source: ScoreError,
    },
    #[error("background task failed: {0}")]
    Background(String),
}

pub trait Store {
    /// Loads every document of `collection`, in creation order.
    fn snapshot(&self, collection: Collection) -> Result<Snapshot, StoreError>;

    /// Inserts a document and returns its newly assigned id.
    fn add(&self, document: NewDocument) -> Result<String, StoreError>;

    fn update(&self, id: &str, update: FieldUpdate) -> Result<(), StoreError>;

    fn delete(&self, collection: Collection, id: &str)
    -> Result<(), StoreError>;

    /// A receiver for the messages sent after every successful write.
    fn changes(&self) -> broadcast::Receiver<Msg>;
}
