use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
};
use hypertext::prelude::*;

use crate::{
    auth::Admin,
    league::{Player, commands},
    state::AppState,
    template::{Page, View},
    upload::Upload,
    util_resp::{StandardResponse, see_other_ok, success},
    views::{blocking, caught_up},
    widgets::{actions::Actions, admin_only::AdminOnly, alert::InfoAlert},
};

pub(crate) struct PlayerRow<'r> {
    pub(crate) player: &'r Player,
    pub(crate) is_admin: bool,
}

impl Renderable for PlayerRow<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            li class="list-group-item d-flex align-items-center gap-3" {
                @if !self.player.photo.is_empty() {
                    img src=(self.player.photo) alt="" width="32" height="32" class="rounded-circle" style="object-fit: cover;";
                }
                span class="flex-grow-1" { (self.player.name) }
                @if self.is_admin {
                    Actions options=(&[(
                        format!("/players/{}/delete", self.player.id).as_str(),
                        "Delete",
                    )]);
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn players_page(
    State(state): State<AppState>,
    admin: Option<Admin>,
) -> StandardResponse {
    let league = state.league();
    let is_admin = admin.is_some();
    let unattached = league.unattached_players().collect::<Vec<_>>();
    let league = &league;

    success(
        Page::new()
            .admin(&admin)
            .active_nav(View::Players)
            .body(maud! {
                h1 class="mb-4" { "Players" }
                @if is_admin {
                    AdminOnly title="Add a player" {
                        @if league.teams.is_empty() {
                            InfoAlert msg="Add a team before adding players.";
                        } @else {
                            form method="post" action="/players" enctype="multipart/form-data" class="row g-3 align-items-end" {
                                div class="col-md-4" {
                                    label for="name" class="form-label" { "Player name" }
                                    input type="text" class="form-control" id="name" name="name" required;
                                }
                                div class="col-md-3" {
                                    label for="team_id" class="form-label" { "Team" }
                                    select class="form-select" id="team_id" name="team_id" required {
                                        option value="" selected { "Select a team" }
                                        @for team in &league.teams {
                                            option value=(team.id) { (team.name) }
                                        }
                                    }
                                }
                                div class="col-md-3" {
                                    label for="photo" class="form-label" { "Photo" }
                                    input type="file" class="form-control" id="photo" name="photo" accept="image/*";
                                }
                                div class="col-md-2" {
                                    button type="submit" class="btn btn-primary w-100" { "Add player" }
                                }
                            }
                        }
                    }
                }
                @if league.players.is_empty() {
                    InfoAlert msg="No players have been added yet.";
                }
                div class="row row-cols-1 row-cols-md-2 g-4" {
                    @for team in &league.teams {
                        div class="col" {
                            h4 { (team.name) }
                            ul class="list-group" {
                                @for player in league.players_of(&team.id) {
                                    PlayerRow player=(player) is_admin=(is_admin);
                                }
                            }
                        }
                    }
                }
                // left behind when deleting a team did not remove all of its
                // players
                @if is_admin && !unattached.is_empty() {
                    div class="mt-4" {
                        AdminOnly title="Players without a team" {
                            ul class="list-group" {
                                @for player in &unattached {
                                    PlayerRow player=(*player) is_admin=(true);
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

pub async fn do_add_player(
    State(state): State<AppState>,
    admin: Admin,
    multipart: Multipart,
) -> StandardResponse {
    let player = Upload::read(multipart, "photo")
        .await?
        .into_player_form()
        .validate()?;

    let store = state.store.clone();
    let id =
        blocking(move || commands::add_player(&store, &admin, player)).await?;
    caught_up(&state, |league| league.players.iter().any(|p| p.id == id))
        .await;

    see_other_ok(Redirect::to(View::Players.path()))
}

pub async fn do_delete_player(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: Admin,
) -> StandardResponse {
    let store = state.store.clone();
    let deleted = id.clone();
    blocking(move || commands::delete_player(&store, &admin, &deleted))
        .await?;
    caught_up(&state, |league| league.players.iter().all(|p| p.id != id))
        .await;

    see_other_ok(Redirect::to(View::Players.path()))
}
