//! Templating code.
//!
//! This defines the [`Page`] item, which every view renders into, and the
//! [`View`] selector which decides the active navigation tab.

use hypertext::{Raw, prelude::*};

use crate::{auth::Admin, store::Collection};

/// The panels of the site. Each one has its own route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Teams,
    Players,
    Matches,
    Table,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Home,
        View::Teams,
        View::Players,
        View::Matches,
        View::Table,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Home => "/",
            View::Teams => "/teams",
            View::Players => "/players",
            View::Matches => "/matches",
            View::Table => "/table",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Teams => "Teams",
            View::Players => "Players",
            View::Matches => "Matches",
            View::Table => "Table",
        }
    }

    /// The collections whose changes should cause this view to re-render.
    pub fn watches(&self) -> &'static [Collection] {
        match self {
            View::Home => &Collection::ALL,
            View::Teams => &Collection::ALL,
            View::Players => &[Collection::Teams, Collection::Players],
            View::Matches => &[Collection::Teams, Collection::Matches],
            View::Table => &[Collection::Teams, Collection::Matches],
        }
    }
}

pub struct Page<R: Renderable> {
    body: Option<R>,
    is_admin: bool,
    active_nav: Option<View>,
}

impl<R: Renderable> Page<R> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub fn admin(mut self, admin: &Option<Admin>) -> Self {
        self.is_admin = admin.is_some();
        self
    }

    pub fn active_nav(mut self, view: View) -> Self {
        self.active_nav = Some(view);
        self
    }

    /// Reloads the page whenever one of the collections the active view
    /// watches changes.
    fn live_reload_script(&self) -> Option<String> {
        let view = self.active_nav?;
        let collections = view
            .watches()
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(",");

        Some(format!(
            r#"
            (function() {{
                var scheme = window.location.protocol === "https:" ? "wss://" : "ws://";
                [{collections}].forEach(function(collection) {{
                    var primed = false;
                    var ws = new WebSocket(scheme + window.location.host + "/sync/" + collection);
                    ws.onmessage = function() {{
                        // the first message is the snapshot the page was rendered from
                        if (primed) {{ window.location.reload(); }}
                        primed = true;
                    }};
                    ws.onerror = function(event) {{
                        console.error("WebSocket error observed:", event);
                    }};
                }});
            }})();
            "#
        ))
    }
}

impl<R: Renderable> Renderable for Page<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let script = self.live_reload_script();

        maud! {
            html {
                head {
                    title { "Matchday" }
                    link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet" crossorigin="anonymous";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #1f4e3d; display: flex; justify-content: space-between; align-items: center;"
                        data-bs-theme="dark" {
                        div class="container-fluid" style="display: flex; justify-content: space-between; align-items: center;" {
                            a class="navbar-brand text-white" href="/" {
                                "Matchday"
                            }
                            ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                @for view in View::ALL {
                                    li class="nav-item" {
                                        @if self.active_nav == Some(view) {
                                            a class="nav-link text-white fw-bold active" aria-current="page" href=(view.path()) {
                                                (view.title())
                                            }
                                        } @else {
                                            a class="nav-link text-white" href=(view.path()) {
                                                (view.title())
                                            }
                                        }
                                    }
                                }
                            }
                            div {
                                ul class="navbar-nav" style="display: flex; gap: 1rem;" data-bs-theme="dark" {
                                    @if self.is_admin {
                                        li class="nav-item" {
                                            span class="navbar-text text-white me-2" { "Admin" }
                                        }
                                        li class="nav-item" {
                                            form method="post" action="/logout" class="d-inline" {
                                                button type="submit" class="btn btn-sm btn-outline-light" {
                                                    "Log out"
                                                }
                                            }
                                        }
                                    } @else {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/login" {
                                                "Admin login"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1 container py-4" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                    @if let Some(script) = &script {
                        script {
                            (Raw::dangerously_create(script))
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R: Renderable> Default for Page<R> {
    fn default() -> Self {
        Self {
            body: None,
            is_admin: false,
            active_nav: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_watch_what_they_show() {
        // home shows counts of all three; team cards count players and
        // matches
        for view in [View::Home, View::Teams] {
            for collection in Collection::ALL {
                assert!(view.watches().contains(&collection), "{view:?}");
            }
        }
        assert!(View::Table.watches().contains(&Collection::Matches));
        assert!(View::Players.watches().contains(&Collection::Players));
    }

    #[test]
    fn pages_listen_on_each_watched_collection() {
        let html = Page::new()
            .active_nav(View::Teams)
            .body(maud! { p { "hi" } })
            .render()
            .into_inner();
        assert!(html.contains(r#"["teams","players","matches"]"#));
    }
}
