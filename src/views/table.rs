use axum::extract::State;
use hypertext::prelude::*;
use serde::Serialize;

use crate::{
    auth::Admin,
    league::standings::{TeamStanding, rank_groups},
    state::AppState,
    template::{Page, View},
    util_resp::{
        StandardResponse, SuccessResponse, error_page, server_error, success,
    },
    widgets::alert::InfoAlert,
};

/// Pairs each row with its position. Teams that are level share a position,
/// written with a trailing `=`, and the next position skips accordingly.
pub fn ranked(standings: &[TeamStanding]) -> Vec<(String, &TeamStanding)> {
    let mut position = 1;
    let mut rows = Vec::with_capacity(standings.len());

    for group in rank_groups(standings) {
        let label = if group.len() > 1 {
            format!("{position}=")
        } else {
            position.to_string()
        };
        position += group.len();
        rows.extend(group.into_iter().map(|standing| (label.clone(), standing)));
    }

    rows
}

pub async fn table_page(
    State(state): State<AppState>,
    admin: Option<Admin>,
) -> StandardResponse {
    let standings = state.league().standings();
    let rows = ranked(&standings);

    success(
        Page::new()
            .admin(&admin)
            .active_nav(View::Table)
            .body(maud! {
                div class="d-flex justify-content-between align-items-center mb-4" {
                    h1 class="mb-0" { "League table" }
                    a href="/table.csv" class="btn btn-outline-secondary btn-sm" { "Download CSV" }
                }
                @if rows.is_empty() {
                    InfoAlert msg="The table is empty until teams have been added.";
                } @else {
                    div class="table-responsive border rounded" {
                        table class="table table-striped mb-0" {
                            thead {
                                tr {
                                    th scope="col" { "#" }
                                    th scope="col" { "Team" }
                                    th scope="col" class="text-end" { "P" }
                                    th scope="col" class="text-end" { "W" }
                                    th scope="col" class="text-end" { "D" }
                                    th scope="col" class="text-end" { "L" }
                                    th scope="col" class="text-end" { "GF" }
                                    th scope="col" class="text-end" { "GA" }
                                    th scope="col" class="text-end" { "GD" }
                                    th scope="col" class="text-end" { "Pts" }
                                }
                            }
                            tbody {
                                @for (rank, row) in &rows {
                                    tr {
                                        th scope="row" { (rank) }
                                        td {
                                            @if !row.logo.is_empty() {
                                                img src=(row.logo) alt="" width="24" height="24" class="me-2" style="object-fit: contain;";
                                            }
                                            (row.name)
                                        }
                                        td class="text-end" { (row.played) }
                                        td class="text-end" { (row.won) }
                                        td class="text-end" { (row.drawn) }
                                        td class="text-end" { (row.lost) }
                                        td class="text-end" { (row.goals_for) }
                                        td class="text-end" { (row.goals_against) }
                                        td class="text-end" { (format!("{:+}", row.goal_difference())) }
                                        td class="text-end fw-bold" { (row.points) }
                                    }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

#[derive(Serialize)]
struct CsvRow<'r> {
    rank: &'r str,
    team: &'r str,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: i64,
    goals_against: i64,
    goal_difference: i64,
    points: u32,
}

pub fn standings_csv(standings: &[TeamStanding]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for (rank, row) in ranked(standings) {
        writer.serialize(CsvRow {
            rank: &rank,
            team: &row.name,
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference(),
            points: row.points,
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    // every field written above is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn table_csv(State(state): State<AppState>) -> StandardResponse {
    let standings = state.league().standings();

    match standings_csv(&standings) {
        Ok(body) => Ok(SuccessResponse::Csv(body)),
        Err(e) => {
            tracing::error!("failed to write standings as csv: {e}");
            server_error(error_page("Could not export the table."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(name: &str, points: u32, goals_for: i64) -> TeamStanding {
        TeamStanding {
            team_id: name.to_lowercase(),
            name: name.to_string(),
            logo: String::new(),
            played: 2,
            won: 0,
            drawn: 0,
            lost: 0,
            points,
            goals_for,
            goals_against: 1,
        }
    }

    #[test]
    fn level_teams_share_a_position() {
        let table = [
            standing("A", 6, 4),
            standing("B", 3, 2),
            standing("C", 3, 2),
            standing("D", 0, 0),
        ];
        let labels = ranked(&table)
            .into_iter()
            .map(|(rank, row)| format!("{rank} {}", row.name))
            .collect::<Vec<_>>();

        assert_eq!(labels, ["1 A", "2= B", "2= C", "4 D"]);
    }

    #[test]
    fn csv_has_a_header_and_one_line_per_team() {
        let table = [standing("Rovers, FC", 3, 2), standing("United", 0, 0)];
        let csv = standings_csv(&table).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();

        assert_eq!(
            lines[0],
            "rank,team,played,won,drawn,lost,goals_for,goals_against,goal_difference,points"
        );
        assert_eq!(lines[1], "1,\"Rovers, FC\",2,0,0,0,2,1,1,3");
        assert_eq!(lines[2], "2,United,2,0,0,0,0,1,-1,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_table_is_empty_csv() {
        assert_eq!(standings_csv(&[]).unwrap(), "");
    }
}
