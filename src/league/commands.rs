//! The mutations an admin can make to the league.
//!
//! Each command is a thin pass-through to the [`Store`], and requires an
//! [`Admin`] token. Commands return as soon as the store has accepted the
//! write; the mirrored league data catches up once the store's change
//! notification has been processed.

use crate::{
    auth::Admin,
    league::{NewMatch, NewPlayer, NewTeam, Player, score::Score},
    store::{Collection, FieldUpdate, NewDocument, Store, StoreError},
};

#[tracing::instrument(skip_all, fields(name = %team.name))]
pub fn add_team<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    team: NewTeam,
) -> Result<String, StoreError> {
    let id = store.add(NewDocument::Team(team))?;
    tracing::info!(%id, "team added");
    Ok(id)
}

/// What happened to the players of a deleted team.
#[derive(Debug, Default)]
pub struct CascadeReport {
    /// Every player a delete was issued for.
    pub attempted: Vec<String>,
    /// The subset of `attempted` which could not be deleted.
    pub failures: Vec<(String, StoreError)>,
}

impl CascadeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deletes a team, and then each player in `known_players` which belongs to
/// it.
///
/// The player deletes are independent of one another: a failure is recorded
/// in the report and the remaining deletes still go ahead. Nothing is rolled
/// back. If the team itself cannot be deleted no player is touched.
#[tracing::instrument(skip(store, _admin, known_players))]
pub fn delete_team<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    id: &str,
    known_players: &[Player],
) -> Result<CascadeReport, StoreError> {
    store.delete(Collection::Teams, id)?;

    let mut report = CascadeReport::default();
    for player in known_players.iter().filter(|p| p.team_id == id) {
        report.attempted.push(player.id.clone());
        if let Err(e) = store.delete(Collection::Players, &player.id) {
            tracing::warn!(player = %player.id, "failed to delete player of removed team: {e}");
            report.failures.push((player.id.clone(), e));
        }
    }

    tracing::info!(
        players = report.attempted.len(),
        failed = report.failures.len(),
        "team deleted"
    );

    Ok(report)
}

#[tracing::instrument(skip_all, fields(name = %player.name, team = %player.team_id))]
pub fn add_player<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    player: NewPlayer,
) -> Result<String, StoreError> {
    let id = store.add(NewDocument::Player(player))?;
    tracing::info!(%id, "player added");
    Ok(id)
}

#[tracing::instrument(skip(store, _admin))]
pub fn delete_player<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    id: &str,
) -> Result<(), StoreError> {
    store.delete(Collection::Players, id)?;
    tracing::info!("player deleted");
    Ok(())
}

/// Schedules a match. It has no score until [`update_score`] is called.
#[tracing::instrument(skip_all, fields(home = %fixture.home_team_id, away = %fixture.away_team_id))]
pub fn add_match<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    fixture: NewMatch,
) -> Result<String, StoreError> {
    let id = store.add(NewDocument::Match(fixture))?;
    tracing::info!(%id, "match added");
    Ok(id)
}

#[tracing::instrument(skip(store, _admin))]
pub fn update_score<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    id: &str,
    score: Option<Score>,
) -> Result<(), StoreError> {
    store.update(id, FieldUpdate::MatchScore(score))?;
    tracing::info!("score updated");
    Ok(())
}

#[tracing::instrument(skip(store, _admin))]
pub fn delete_match<S: Store + ?Sized>(
    store: &S,
    _admin: &Admin,
    id: &str,
) -> Result<(), StoreError> {
    store.delete(Collection::Matches, id)?;
    tracing::info!("match deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::broadcast;

    use super::*;
    use crate::{
        auth::{AdminSession, DEFAULT_ADMIN_PASSWORD},
        msg::Msg,
        store::{Snapshot, sqlite::SqliteStore},
        test::memory_store,
    };

    fn admin() -> Admin {
        let mut session = AdminSession::with_password(DEFAULT_ADMIN_PASSWORD);
        session.login();
        session.admin().unwrap()
    }

    fn player(id: &str, team_id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            team_id: team_id.to_string(),
            photo: String::new(),
        }
    }

    /// Records every delete and fails the ones listed in `failing`.
    struct RecordingStore {
        deletes: Mutex<Vec<(Collection, String)>>,
        failing: Vec<String>,
        tx: broadcast::Sender<Msg>,
    }

    impl RecordingStore {
        fn failing(ids: &[&str]) -> Self {
            Self {
                deletes: Mutex::new(Vec::new()),
                failing: ids.iter().map(|id| id.to_string()).collect(),
                tx: broadcast::channel(16).0,
            }
        }

        fn deletes(&self) -> Vec<(Collection, String)> {
            self.deletes.lock().unwrap().clone()
        }
    }

    impl Store for RecordingStore {
        fn snapshot(
            &self,
            collection: Collection,
        ) -> Result<Snapshot, StoreError> {
            Ok(match collection {
                Collection::Teams => Snapshot::Teams(vec![]),
                Collection::Players => Snapshot::Players(vec![]),
                Collection::Matches => Snapshot::Matches(vec![]),
            })
        }

        fn add(&self, _: NewDocument) -> Result<String, StoreError> {
            Ok("new".to_string())
        }

        fn update(&self, _: &str, _: FieldUpdate) -> Result<(), StoreError> {
            Ok(())
        }

        fn delete(
            &self,
            collection: Collection,
            id: &str,
        ) -> Result<(), StoreError> {
            self.deletes
                .lock()
                .unwrap()
                .push((collection, id.to_string()));
            if self.failing.iter().any(|f| f == id) {
                Err(StoreError::Background(format!("refusing to delete {id}")))
            } else {
                Ok(())
            }
        }

        fn changes(&self) -> broadcast::Receiver<Msg> {
            self.tx.subscribe()
        }
    }

    #[test]
    fn deleting_a_team_issues_one_delete_per_player() {
        let store = RecordingStore::failing(&[]);
        let players = [
            player("p1", "t"),
            player("p2", "other"),
            player("p3", "t"),
            player("p4", "t"),
        ];

        let report = delete_team(&store, &admin(), "t", &players).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.attempted, vec!["p1", "p3", "p4"]);
        assert_eq!(
            store.deletes(),
            vec![
                (Collection::Teams, "t".to_string()),
                (Collection::Players, "p1".to_string()),
                (Collection::Players, "p3".to_string()),
                (Collection::Players, "p4".to_string()),
            ]
        );
    }

    #[test]
    fn cascade_continues_past_failures() {
        let store = RecordingStore::failing(&["p1"]);
        let players = [player("p1", "t"), player("p2", "t")];

        let report = delete_team(&store, &admin(), "t", &players).unwrap();

        assert_eq!(store.deletes().len(), 3);
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "p1");
    }

    #[test]
    fn failed_team_delete_touches_no_players() {
        let store = RecordingStore::failing(&["t"]);
        let players = [player("p1", "t")];

        assert!(delete_team(&store, &admin(), "t", &players).is_err());
        assert_eq!(store.deletes(), vec![(Collection::Teams, "t".to_string())]);
    }

    fn players_in(store: &SqliteStore) -> Vec<Player> {
        match store.snapshot(Collection::Players).unwrap() {
            Snapshot::Players(players) => players,
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[test]
    fn full_lifecycle_against_sqlite() {
        let store = memory_store();
        let admin = admin();

        let rovers = add_team(
            &store,
            &admin,
            NewTeam {
                name: "Rovers".into(),
                logo: String::new(),
            },
        )
        .unwrap();
        let united = add_team(
            &store,
            &admin,
            NewTeam {
                name: "United".into(),
                logo: String::new(),
            },
        )
        .unwrap();
        for name in ["Ann", "Bo"] {
            add_player(
                &store,
                &admin,
                NewPlayer {
                    name: name.into(),
                    team_id: rovers.clone(),
                    photo: String::new(),
                },
            )
            .unwrap();
        }
        let keeper = add_player(
            &store,
            &admin,
            NewPlayer {
                name: "Cy".into(),
                team_id: united.clone(),
                photo: String::new(),
            },
        )
        .unwrap();

        let fixture = add_match(
            &store,
            &admin,
            NewMatch {
                home_team_id: rovers.clone(),
                away_team_id: united.clone(),
                date: chrono::NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            },
        )
        .unwrap();
        update_score(&store, &admin, &fixture, Some(Score::new(1, 0))).unwrap();

        let players = players_in(&store);
        let report = delete_team(&store, &admin, &rovers, &players).unwrap();
        assert_eq!(report.attempted.len(), 2);
        assert!(report.is_complete());

        let remaining = players_in(&store);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keeper);

        delete_player(&store, &admin, &keeper).unwrap();
        delete_match(&store, &admin, &fixture).unwrap();
        assert!(matches!(
            delete_match(&store, &admin, &fixture),
            Err(StoreError::NotFound { .. })
        ));
    }
}
