//! The three kinds of document kept by the league, and the logic which acts
//! on them.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::league::score::{Score, ScoreError};

pub mod commands;
pub mod score;
pub mod standings;

#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    /// A `data:` URI, or the empty string.
    pub logo: String,
    /// Written as zero when the team is created and never updated. The
    /// standings are always recomputed from the match history instead.
    pub points: i64,
    pub goals_for: i64,
    pub goals_against: i64,
}

#[derive(Queryable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Not checked against the teams collection.
    pub team_id: String,
    pub photo: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub date: NaiveDate,
    /// `None` until the match has been played.
    pub score: Option<Score>,
}

impl Match {
    pub fn is_played(&self) -> bool {
        self.score.is_some()
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// A `matches` row as stored, before the score has been parsed.
#[derive(Queryable)]
pub struct MatchRow {
    pub id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub date: NaiveDate,
    pub score: Option<String>,
}

impl TryFrom<MatchRow> for Match {
    type Error = ScoreError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        Ok(Match {
            score: row.score.as_deref().map(str::parse::<Score>).transpose()?,
            id: row.id,
            home_team_id: row.home_team_id,
            away_team_id: row.away_team_id,
            date: row.date,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub logo: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub team_id: String,
    pub photo: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMatch {
    pub home_team_id: String,
    pub away_team_id: String,
    pub date: NaiveDate,
}
