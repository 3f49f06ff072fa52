//! Keeps a local copy of the league in step with the store.

use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::watch, task::JoinSet};

use crate::{
    league::{
        Match, Player, Team,
        standings::{TeamStanding, compute_standings},
    },
    store::{Collection, Snapshot, Store, subscription::Subscription},
};

/// The mirrored contents of all three collections.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LeagueData {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
}

impl LeagueData {
    /// Replaces the collection the snapshot belongs to. The other two
    /// collections are left as they are.
    pub fn apply(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Teams(teams) => self.teams = teams,
            Snapshot::Players(players) => self.players = players,
            Snapshot::Matches(matches) => self.matches = matches,
        }
    }

    pub fn standings(&self) -> Vec<TeamStanding> {
        compute_standings(&self.teams, &self.matches)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == id)
    }

    pub fn team_name<'a>(&'a self, id: &str) -> &'a str {
        self.team(id)
            .map(|team| team.name.as_str())
            .unwrap_or("(removed team)")
    }

    pub fn players_of<'a>(
        &'a self,
        team_id: &'a str,
    ) -> impl Iterator<Item = &'a Player> + 'a {
        self.players
            .iter()
            .filter(move |player| player.team_id == team_id)
    }

    /// Players whose team is not (or no longer) in the teams collection.
    pub fn unattached_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players
            .iter()
            .filter(|player| self.team(&player.team_id).is_none())
    }
}

/// Drives one [`Subscription`] per collection and publishes the result
/// through a [`watch`] channel.
pub struct Mirror {
    tasks: JoinSet<()>,
}

impl Mirror {
    pub fn spawn<S>(store: S) -> (Self, watch::Receiver<LeagueData>)
    where
        S: Store + Clone + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(LeagueData::default());
        let tx = Arc::new(tx);
        let mut tasks = JoinSet::new();

        for collection in Collection::ALL {
            // created here rather than inside the task, so that the
            // subscription is live by the time `spawn` returns
            let mut subscription = Subscription::new(store.clone(), collection);
            let tx = tx.clone();

            tasks.spawn(async move {
                while let Some(snapshot) = subscription.next().await {
                    match snapshot {
                        Ok(snapshot) => {
                            tracing::debug!(
                                %collection,
                                documents = snapshot.len(),
                                "replacing mirrored collection"
                            );
                            tx.send_modify(|data| data.apply(snapshot));
                        }
                        Err(e) => {
                            tracing::error!(%collection, "failed to load snapshot: {e}");
                        }
                    }
                }
                tracing::info!(%collection, "change feed closed");
            });
        }

        (Mirror { tasks }, rx)
    }

    /// Stops all subscriptions and waits until they have been released.
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
        tracing::info!("mirror stopped");
    }
}
