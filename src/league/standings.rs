use std::cmp::Ordering;

use itertools::Itertools;
use serde::Serialize;

use crate::league::{Match, Team};

/// One row of the league table.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: String,
    pub name: String,
    pub logo: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub points: u32,
    pub goals_for: i64,
    pub goals_against: i64,
}

impl TeamStanding {
    fn new(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            name: team.name.clone(),
            logo: team.logo.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            points: 0,
            goals_for: 0,
            goals_against: 0,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for - self.goals_against
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        // a single score may be anywhere in the u32 range
        self.goals_for += i64::from(scored);
        self.goals_against += i64::from(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += 3;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += 1;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Computes the league table from the raw match results.
///
/// Unplayed matches are skipped. A match counts for a team if the team is
/// its home side or, failing that, its away side; a team that is neither gets
/// nothing from it. Rows are ordered by points, then goal difference, both
/// descending. The sort is stable, so teams which are level on both keep the
/// order in which they were given.
pub fn compute_standings(
    teams: &[Team],
    matches: &[Match],
) -> Vec<TeamStanding> {
    let mut table = teams
        .iter()
        .map(|team| {
            let mut standing = TeamStanding::new(team);
            for m in matches {
                let Some(score) = m.score else {
                    continue;
                };
                if m.home_team_id == team.id {
                    standing.record(score.home, score.away);
                } else if m.away_team_id == team.id {
                    standing.record(score.away, score.home);
                }
            }
            standing
        })
        .collect::<Vec<_>>();

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
    });

    table
}

/// Splits an already sorted table into ranks. Teams level on points and goal
/// difference share a rank.
pub fn rank_groups(standings: &[TeamStanding]) -> Vec<Vec<&TeamStanding>> {
    let chunks = standings
        .iter()
        .chunk_by(|standing| (standing.points, standing.goal_difference()));

    chunks
        .into_iter()
        .map(|(_, group)| group.collect())
        .collect()
}
