use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
};
use hypertext::prelude::*;

use crate::{
    auth::Admin,
    league::commands,
    state::AppState,
    template::{Page, View},
    upload::Upload,
    util_resp::{StandardResponse, see_other_ok, server_error, success},
    views::{blocking, caught_up, players::PlayerRow},
    widgets::{
        actions::Actions,
        admin_only::AdminOnly,
        alert::{ErrorAlert, InfoAlert},
    },
};

pub async fn teams_page(
    State(state): State<AppState>,
    admin: Option<Admin>,
) -> StandardResponse {
    let league = state.league();
    let is_admin = admin.is_some();

    success(
        Page::new()
            .admin(&admin)
            .active_nav(View::Teams)
            .body(maud! {
                h1 class="mb-4" { "Teams" }
                @if is_admin {
                    AdminOnly title="Add a team" {
                        form method="post" action="/teams" enctype="multipart/form-data" class="row g-3 align-items-end" {
                            div class="col-md-6" {
                                label for="name" class="form-label" { "Team name" }
                                input type="text" class="form-control" id="name" name="name" required;
                            }
                            div class="col-md-4" {
                                label for="logo" class="form-label" { "Logo" }
                                input type="file" class="form-control" id="logo" name="logo" accept="image/*";
                            }
                            div class="col-md-2" {
                                button type="submit" class="btn btn-primary w-100" { "Add team" }
                            }
                        }
                    }
                }
                @if league.teams.is_empty() {
                    InfoAlert msg="No teams have been added yet.";
                }
                div class="row row-cols-1 row-cols-md-3 g-3" {
                    @for team in &league.teams {
                        div class="col" {
                            div class="card h-100" {
                                div class="card-body d-flex align-items-center gap-3" {
                                    @if !team.logo.is_empty() {
                                        img src=(team.logo) alt="" width="48" height="48" style="object-fit: contain;";
                                    }
                                    div class="flex-grow-1" {
                                        h5 class="card-title mb-0" { (team.name) }
                                        small class="text-muted" {
                                            (league.players_of(&team.id).count()) " player(s), "
                                            (league.matches.iter().filter(|m| m.involves(&team.id)).count()) " match(es)"
                                        }
                                    }
                                }
                                details class="card-body border-top py-2" {
                                    summary class="text-muted" { "Players" }
                                    @if league.players_of(&team.id).next().is_none() {
                                        p class="text-muted small mt-2 mb-0" { "No players." }
                                    } @else {
                                        ul class="list-group list-group-flush mt-2" {
                                            @for player in league.players_of(&team.id) {
                                                PlayerRow player=(player) is_admin=(is_admin);
                                            }
                                        }
                                    }
                                }
                                @if is_admin {
                                    div class="card-footer" {
                                        Actions options=(&[(
                                            format!("/teams/{}/delete", team.id).as_str(),
                                            "Delete team and its players",
                                        )]);
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

pub async fn do_add_team(
    State(state): State<AppState>,
    admin: Admin,
    multipart: Multipart,
) -> StandardResponse {
    let team = Upload::read(multipart, "logo")
        .await?
        .into_team_form()
        .validate()?;

    let store = state.store.clone();
    let id = blocking(move || commands::add_team(&store, &admin, team)).await?;
    caught_up(&state, |league| league.team(&id).is_some()).await;

    see_other_ok(Redirect::to(View::Teams.path()))
}

/// Deletes the team, then each of its players as currently mirrored.
pub async fn do_delete_team(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: Admin,
) -> StandardResponse {
    let players = state.league().players;
    let store = state.store.clone();
    let deleted = id.clone();
    let report = blocking(move || {
        commands::delete_team(&store, &admin, &deleted, &players)
    })
    .await?;

    let removed = report
        .attempted
        .iter()
        .filter(|player| !report.failures.iter().any(|(id, _)| id == *player))
        .collect::<Vec<_>>();
    caught_up(&state, |league| {
        league.team(&id).is_none()
            && league.players.iter().all(|p| !removed.contains(&&p.id))
    })
    .await;

    if !report.is_complete() {
        let failed = report
            .failures
            .iter()
            .map(|(player, e)| format!("{player}: {e}"))
            .collect::<Vec<_>>();

        return server_error(
            Page::new()
                .body(maud! {
                    ErrorAlert msg=(format!(
                        "The team was deleted, but {} of its {} player(s) could not be removed.",
                        failed.len(),
                        report.attempted.len(),
                    ));
                    ul {
                        @for line in &failed {
                            li { code { (line) } }
                        }
                    }
                    a href=(View::Players.path()) class="btn btn-secondary" { "See remaining players" }
                })
                .render(),
        );
    }

    see_other_ok(Redirect::to(View::Teams.path()))
}
