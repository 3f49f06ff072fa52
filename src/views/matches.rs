use axum::{
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::Form;
use hypertext::prelude::*;
use itertools::Itertools;

use crate::{
    auth::Admin,
    league::commands,
    state::AppState,
    template::{Page, View},
    util_resp::{StandardResponse, see_other_ok, success},
    validation::{MatchForm, ScoreForm},
    views::{blocking, caught_up},
    widgets::{actions::Actions, admin_only::AdminOnly, alert::InfoAlert},
};

pub async fn matches_page(
    State(state): State<AppState>,
    admin: Option<Admin>,
) -> StandardResponse {
    let league = state.league();
    let is_admin = admin.is_some();
    let by_date = league
        .matches
        .iter()
        .sorted_by_key(|m| m.date)
        .chunk_by(|m| m.date)
        .into_iter()
        .map(|(date, day)| (date, day.collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    let league = &league;

    success(
        Page::new()
            .admin(&admin)
            .active_nav(View::Matches)
            .body(maud! {
                h1 class="mb-4" { "Matches" }
                @if is_admin {
                    AdminOnly title="Schedule a match" {
                        @if league.teams.len() < 2 {
                            InfoAlert msg="At least two teams are needed to schedule a match.";
                        } @else {
                            form method="post" action="/matches" class="row g-3 align-items-end" {
                                div class="col-md-4" {
                                    label for="home_team_id" class="form-label" { "Home" }
                                    select class="form-select" id="home_team_id" name="home_team_id" required {
                                        option value="" selected { "Select a team" }
                                        @for team in &league.teams {
                                            option value=(team.id) { (team.name) }
                                        }
                                    }
                                }
                                div class="col-md-4" {
                                    label for="away_team_id" class="form-label" { "Away" }
                                    select class="form-select" id="away_team_id" name="away_team_id" required {
                                        option value="" selected { "Select a team" }
                                        @for team in &league.teams {
                                            option value=(team.id) { (team.name) }
                                        }
                                    }
                                }
                                div class="col-md-2" {
                                    label for="date" class="form-label" { "Date" }
                                    input type="date" class="form-control" id="date" name="date" required;
                                }
                                div class="col-md-2" {
                                    button type="submit" class="btn btn-primary w-100" { "Schedule" }
                                }
                            }
                        }
                    }
                }
                @if league.matches.is_empty() {
                    InfoAlert msg="No matches have been scheduled yet.";
                }
                @for (date, day) in &by_date {
                    h5 class="mt-4" { (date.format("%A %e %B %Y").to_string()) }
                    div class="table-responsive border rounded" {
                        table class="table mb-0 align-middle" {
                            tbody {
                                @for m in day {
                                    tr {
                                        td class="text-end w-25" { (league.team_name(&m.home_team_id)) }
                                        td class="text-center" style="width: 14rem;" {
                                            @if is_admin {
                                                form method="post" action=(format!("/matches/{}/score", m.id)) class="d-flex gap-1 justify-content-center" {
                                                    input type="text" class="form-control form-control-sm text-center" name="score"
                                                        placeholder="e.g. 2-1" style="width: 6rem;"
                                                        value=(m.score.map(|s| s.to_string()).unwrap_or_default());
                                                    button type="submit" class="btn btn-sm btn-outline-primary" { "Save" }
                                                }
                                            } @else if let Some(score) = &m.score {
                                                strong { (score.to_string()) }
                                            } @else {
                                                span class="text-muted" { "v" }
                                            }
                                        }
                                        td class="w-25" { (league.team_name(&m.away_team_id)) }
                                        @if is_admin {
                                            td class="text-end" {
                                                Actions options=(&[(
                                                    format!("/matches/{}/delete", m.id).as_str(),
                                                    "Delete",
                                                )]);
                                            }
                                        }
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

pub async fn do_add_match(
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<MatchForm>,
) -> StandardResponse {
    let fixture = form.validate()?;

    let store = state.store.clone();
    let id =
        blocking(move || commands::add_match(&store, &admin, fixture)).await?;
    caught_up(&state, |league| league.matches.iter().any(|m| m.id == id))
        .await;

    see_other_ok(Redirect::to(View::Matches.path()))
}

/// Sets the score of a match, or clears it when the field is left empty.
pub async fn do_update_score(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: Admin,
    Form(form): Form<ScoreForm>,
) -> StandardResponse {
    let score = form.validate()?;

    let store = state.store.clone();
    let updated = id.clone();
    blocking(move || commands::update_score(&store, &admin, &updated, score))
        .await?;
    caught_up(&state, |league| {
        league.matches.iter().any(|m| m.id == id && m.score == score)
    })
    .await;

    see_other_ok(Redirect::to(View::Matches.path()))
}

pub async fn do_delete_match(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: Admin,
) -> StandardResponse {
    let store = state.store.clone();
    let deleted = id.clone();
    blocking(move || commands::delete_match(&store, &admin, &deleted))
        .await?;
    caught_up(&state, |league| league.matches.iter().all(|m| m.id != id))
        .await;

    see_other_ok(Redirect::to(View::Matches.path()))
}
