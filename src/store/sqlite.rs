use diesel::prelude::*;
use tokio::sync::broadcast::{self, Receiver, Sender};
use uuid::Uuid;

use crate::{
    league::{Match, MatchRow, Player, Team},
    msg::{Msg, MsgContents},
    schema::{matches, players, teams},
    state::DbPool,
    store::{
        Collection, FieldUpdate, NewDocument, Snapshot, Store, StoreError,
    },
};

/// A [`Store`] kept in SQLite.
///
/// Each operation checks a connection out of the pool, runs a single
/// statement and returns the connection before notifying subscribers, so
/// that a subscriber reloading its snapshot always sees the write.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    tx: Sender<Msg>,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        let (tx, _) = broadcast::channel::<Msg>(1000);
        Self { pool, tx }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn notify(&self, collection: Collection, inner: MsgContents) {
        // an error only means that nobody is subscribed right now
        let _ = self.tx.send(Msg { collection, inner });
    }

    fn not_found(collection: Collection, id: &str) -> StoreError {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

impl Store for SqliteStore {
    #[tracing::instrument(skip(self))]
    fn snapshot(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        let mut conn = self.pool.get()?;

        let snapshot = match collection {
            Collection::Teams => Snapshot::Teams(
                teams::table
                    .order_by(teams::id.asc())
                    .load::<Team>(&mut *conn)?,
            ),
            Collection::Players => Snapshot::Players(
                players::table
                    .order_by(players::id.asc())
                    .load::<Player>(&mut *conn)?,
            ),
            Collection::Matches => Snapshot::Matches(
                matches::table
                    .order_by(matches::id.asc())
                    .load::<MatchRow>(&mut *conn)?
                    .into_iter()
                    .map(|row| {
                        let id = row.id.clone();
                        Match::try_from(row).map_err(|source| {
                            StoreError::CorruptScore { id, source }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        tracing::trace!("loaded {} document(s)", snapshot.len());

        Ok(snapshot)
    }

    #[tracing::instrument(skip_all, fields(collection = %document.collection()))]
    fn add(&self, document: NewDocument) -> Result<String, StoreError> {
        let id = Uuid::now_v7().to_string();
        let collection = document.collection();

        {
            let mut conn = self.pool.get()?;
            let n = match document {
                NewDocument::Team(team) => diesel::insert_into(teams::table)
                    .values((
                        teams::id.eq(&id),
                        teams::name.eq(&team.name),
                        teams::logo.eq(&team.logo),
                        teams::points.eq(0),
                        teams::goals_for.eq(0),
                        teams::goals_against.eq(0),
                    ))
                    .execute(&mut *conn)?,
                NewDocument::Player(player) => {
                    diesel::insert_into(players::table)
                        .values((
                            players::id.eq(&id),
                            players::name.eq(&player.name),
                            players::team_id.eq(&player.team_id),
                            players::photo.eq(&player.photo),
                        ))
                        .execute(&mut *conn)?
                }
                NewDocument::Match(m) => diesel::insert_into(matches::table)
                    .values((
                        matches::id.eq(&id),
                        matches::home_team_id.eq(&m.home_team_id),
                        matches::away_team_id.eq(&m.away_team_id),
                        matches::date.eq(m.date),
                        matches::score.eq(None::<String>),
                    ))
                    .execute(&mut *conn)?,
            };
            debug_assert_eq!(n, 1);
        }

        tracing::debug!(%id, "added document");
        self.notify(collection, MsgContents::Added(id.clone()));

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    fn update(&self, id: &str, update: FieldUpdate) -> Result<(), StoreError> {
        let collection = update.collection();

        let n = {
            let mut conn = self.pool.get()?;
            match update {
                FieldUpdate::MatchScore(score) => {
                    diesel::update(matches::table.filter(matches::id.eq(id)))
                        .set(
                            matches::score
                                .eq(score.map(|score| score.to_string())),
                        )
                        .execute(&mut *conn)?
                }
            }
        };

        if n == 0 {
            return Err(Self::not_found(collection, id));
        }

        self.notify(collection, MsgContents::Modified(id.to_string()));

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<(), StoreError> {
        let n = {
            let mut conn = self.pool.get()?;
            match collection {
                Collection::Teams => {
                    diesel::delete(teams::table.filter(teams::id.eq(id)))
                        .execute(&mut *conn)?
                }
                Collection::Players => {
                    diesel::delete(players::table.filter(players::id.eq(id)))
                        .execute(&mut *conn)?
                }
                Collection::Matches => {
                    diesel::delete(matches::table.filter(matches::id.eq(id)))
                        .execute(&mut *conn)?
                }
            }
        };

        if n == 0 {
            return Err(Self::not_found(collection, id));
        }

        self.notify(collection, MsgContents::Removed(id.to_string()));

        Ok(())
    }

    fn changes(&self) -> Receiver<Msg> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        league::{NewMatch, NewPlayer, NewTeam, score::Score},
        test::memory_store,
    };

    fn new_team(name: &str) -> NewDocument {
        NewDocument::Team(NewTeam {
            name: name.to_string(),
            logo: String::new(),
        })
    }

    #[test]
    fn teams_are_created_with_zeroed_aggregates() {
        let store = memory_store();
        let id = store.add(new_team("Rovers")).unwrap();

        let Snapshot::Teams(teams) =
            store.snapshot(Collection::Teams).unwrap()
        else {
            panic!("expected a teams snapshot");
        };
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, id);
        assert_eq!(teams[0].name, "Rovers");
        assert_eq!(
            (teams[0].points, teams[0].goals_for, teams[0].goals_against),
            (0, 0, 0)
        );
    }

    #[test]
    fn snapshots_list_documents_in_creation_order() {
        let store = memory_store();
        let ids = ["One", "Two", "Three"]
            .map(|name| store.add(new_team(name)).unwrap());

        let Snapshot::Teams(teams) =
            store.snapshot(Collection::Teams).unwrap()
        else {
            panic!("expected a teams snapshot");
        };
        let loaded = teams.into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(loaded, ids.to_vec());
    }

    #[test]
    fn match_scores_round_trip_through_the_table() {
        let store = memory_store();
        let id = store
            .add(NewDocument::Match(NewMatch {
                home_team_id: "h".into(),
                away_team_id: "a".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            }))
            .unwrap();

        let Snapshot::Matches(matches) =
            store.snapshot(Collection::Matches).unwrap()
        else {
            panic!("expected a matches snapshot");
        };
        assert_eq!(matches[0].score, None);

        store
            .update(&id, FieldUpdate::MatchScore(Some(Score::new(3, 1))))
            .unwrap();
        let Snapshot::Matches(matches) =
            store.snapshot(Collection::Matches).unwrap()
        else {
            panic!("expected a matches snapshot");
        };
        assert_eq!(matches[0].score, Some(Score::new(3, 1)));

        store.update(&id, FieldUpdate::MatchScore(None)).unwrap();
        let Snapshot::Matches(matches) =
            store.snapshot(Collection::Matches).unwrap()
        else {
            panic!("expected a matches snapshot");
        };
        assert!(!matches[0].is_played());
    }

    #[test]
    fn missing_documents_are_reported() {
        let store = memory_store();
        assert!(matches!(
            store.delete(Collection::Players, "nope"),
            Err(StoreError::NotFound { collection: Collection::Players, .. })
        ));
        assert!(matches!(
            store.update("nope", FieldUpdate::MatchScore(None)),
            Err(StoreError::NotFound { collection: Collection::Matches, .. })
        ));
    }

    #[test]
    fn corrupt_stored_scores_fail_the_snapshot() {
        let store = memory_store();
        let id = store
            .add(NewDocument::Match(NewMatch {
                home_team_id: "h".into(),
                away_team_id: "a".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            }))
            .unwrap();

        let mut conn = store.pool().get().unwrap();
        diesel::update(matches::table.filter(matches::id.eq(&id)))
            .set(matches::score.eq("two-one"))
            .execute(&mut *conn)
            .unwrap();
        drop(conn);

        assert!(matches!(
            store.snapshot(Collection::Matches),
            Err(StoreError::CorruptScore { .. })
        ));
    }

    #[test]
    fn writes_are_broadcast() {
        let store = memory_store();
        let mut rx = store.changes();

        let team = store.add(new_team("Rovers")).unwrap();
        let player = store
            .add(NewDocument::Player(NewPlayer {
                name: "Sam".into(),
                team_id: team.clone(),
                photo: String::new(),
            }))
            .unwrap();
        store.delete(Collection::Players, &player).unwrap();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.collection, Collection::Teams);
        assert_eq!(msg.inner, MsgContents::Added(team));
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.collection, Collection::Players);
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.inner, MsgContents::Removed(player));
        assert!(rx.try_recv().is_err());
    }
}
