//! The forms submitted by the admin, and the checks they must pass before
//! they reach the store.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::league::{
    NewMatch, NewPlayer, NewTeam,
    score::{Score, ScoreError},
};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("please select a team")]
    NoTeamSelected,
    #[error("a team cannot play against itself")]
    SameTeams,
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid score format")]
    InvalidScore(#[from] ScoreError),
}

/// Trims `value`, failing if nothing is left.
pub fn non_empty(field: &'static str, value: &str) -> Result<String, FormError> {
    match value.trim() {
        "" => Err(FormError::Empty(field)),
        trimmed => Ok(trimmed.to_string()),
    }
}

pub fn is_valid_date(string: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(string.trim(), "%Y-%m-%d")
        .map_err(|_| FormError::InvalidDate(string.to_string()))
}

/// Built from the multipart body of `POST /teams`.
#[derive(Debug, Default)]
pub struct TeamForm {
    pub name: String,
    /// A `data:` URI, if a file was chosen.
    pub logo: Option<String>,
}

impl TeamForm {
    pub fn validate(self) -> Result<NewTeam, FormError> {
        Ok(NewTeam {
            name: non_empty("team name", &self.name)?,
            logo: self.logo.unwrap_or_default(),
        })
    }
}

/// Built from the multipart body of `POST /players`.
#[derive(Debug, Default)]
pub struct PlayerForm {
    pub name: String,
    pub team_id: String,
    pub photo: Option<String>,
}

impl PlayerForm {
    pub fn validate(self) -> Result<NewPlayer, FormError> {
        let name = non_empty("player name", &self.name)?;
        let team_id = match self.team_id.trim() {
            "" => return Err(FormError::NoTeamSelected),
            id => id.to_string(),
        };

        Ok(NewPlayer {
            name,
            team_id,
            photo: self.photo.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct MatchForm {
    #[serde(default)]
    pub home_team_id: String,
    #[serde(default)]
    pub away_team_id: String,
    #[serde(default)]
    pub date: String,
}

impl MatchForm {
    pub fn validate(self) -> Result<NewMatch, FormError> {
        let home_team_id = self.home_team_id.trim();
        let away_team_id = self.away_team_id.trim();
        if home_team_id.is_empty() || away_team_id.is_empty() {
            return Err(FormError::NoTeamSelected);
        }
        if home_team_id == away_team_id {
            return Err(FormError::SameTeams);
        }

        Ok(NewMatch {
            home_team_id: home_team_id.to_string(),
            away_team_id: away_team_id.to_string(),
            date: is_valid_date(&self.date)?,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ScoreForm {
    #[serde(default)]
    pub score: String,
}

impl ScoreForm {
    /// An empty field clears the score.
    pub fn validate(self) -> Result<Option<Score>, FormError> {
        if self.score.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.score.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn team_names_are_trimmed() {
        let team = TeamForm {
            name: "  Rovers ".to_string(),
            logo: None,
        }
        .validate()
        .unwrap();
        assert_eq!(team.name, "Rovers");
        assert_eq!(team.logo, "");
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = TeamForm {
            name: "   ".to_string(),
            logo: Some("data:image/png;base64,AA==".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FormError::Empty("team name"));

        let err = PlayerForm {
            name: String::new(),
            team_id: "t1".to_string(),
            photo: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FormError::Empty("player name"));
    }

    #[test]
    fn player_needs_a_team() {
        let err = PlayerForm {
            name: "Ada".to_string(),
            team_id: " ".to_string(),
            photo: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FormError::NoTeamSelected);
    }

    #[test]
    fn match_sides_must_differ() {
        let form = MatchForm {
            home_team_id: "a".to_string(),
            away_team_id: "a".to_string(),
            date: "2024-05-01".to_string(),
        };
        assert_eq!(form.validate().unwrap_err(), FormError::SameTeams);

        let form = MatchForm {
            home_team_id: "a".to_string(),
            away_team_id: String::new(),
            date: "2024-05-01".to_string(),
        };
        assert_eq!(form.validate().unwrap_err(), FormError::NoTeamSelected);
    }

    #[test]
    fn match_dates() {
        let fixture = MatchForm {
            home_team_id: "a".to_string(),
            away_team_id: "b".to_string(),
            date: "2024-05-01".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(fixture.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        for bad in ["", "01/05/2024", "2024-13-01"] {
            let form = MatchForm {
                home_team_id: "a".to_string(),
                away_team_id: "b".to_string(),
                date: bad.to_string(),
            };
            assert!(
                matches!(form.validate(), Err(FormError::InvalidDate(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_score_clears() {
        let form = ScoreForm {
            score: "  ".to_string(),
        };
        assert_eq!(form.validate().unwrap(), None);
    }

    #[test]
    fn score_is_parsed() {
        let form = ScoreForm {
            score: " 3 - 0 ".to_string(),
        };
        assert_eq!(form.validate().unwrap(), Some(Score::new(3, 0)));

        let form = ScoreForm {
            score: "3:0".to_string(),
        };
        let err = form.validate().unwrap_err();
        assert!(matches!(err, FormError::InvalidScore(_)));
        assert_eq!(err.to_string(), "invalid score format");
    }
}
