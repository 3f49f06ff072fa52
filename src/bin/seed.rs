//! Fills a database with a demo league.

use chrono::{Days, NaiveDate};
use clap::Parser;
use matchday::{
    auth::{AdminSession, DEFAULT_ADMIN_PASSWORD},
    league::{NewMatch, NewPlayer, NewTeam, commands, score::Score},
    state::{make_pool, run_migrations},
    store::{Collection, Store, sqlite::SqliteStore},
};

const TEAM_NAMES: [&str; 12] = [
    "Ashford Rovers",
    "Brookside Albion",
    "Castle Hill",
    "Dunmore Athletic",
    "Eastgate United",
    "Fenwick Town",
    "Greyfield Wanderers",
    "Harbour City",
    "Ironbridge",
    "Juniper Park",
    "Kingsmead",
    "Larkhill Villa",
];

const PLAYER_NAMES: [&str; 10] = [
    "Alex", "Sam", "Jordan", "Robin", "Charlie", "Jamie", "Morgan", "Casey",
    "Riley", "Quinn",
];

const PLAYERS_PER_TEAM: usize = 5;

#[derive(Parser)]
#[clap(about = "Fills a database with a demo league.")]
pub struct Seed {
    #[clap(env = "DATABASE_URL")]
    database_url: String,
    /// How many teams to create.
    #[clap(long, short, default_value_t = 8)]
    teams: usize,
    /// How many of the scheduled matches get a result.
    #[clap(long, short, default_value_t = 10)]
    played: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let args = Seed::parse();
    let n_teams = args.teams.clamp(2, TEAM_NAMES.len());

    let pool = make_pool(&args.database_url)?;
    run_migrations(&pool)?;
    let store = SqliteStore::new(pool);

    if !store.snapshot(Collection::Teams)?.is_empty() {
        return Err("the database already contains a league".into());
    }

    let mut session = AdminSession::with_password(DEFAULT_ADMIN_PASSWORD);
    session.login();
    let admin = session.admin().ok_or("could not log in as admin")?;

    let mut team_ids = Vec::with_capacity(n_teams);
    for (i, name) in TEAM_NAMES.iter().take(n_teams).enumerate() {
        let team_id = commands::add_team(
            &store,
            &admin,
            NewTeam {
                name: name.to_string(),
                logo: String::new(),
            },
        )?;

        for j in 0..PLAYERS_PER_TEAM {
            let first = PLAYER_NAMES[(i + j) % PLAYER_NAMES.len()];
            commands::add_player(
                &store,
                &admin,
                NewPlayer {
                    name: format!("{first} {}", name.split(' ').next().unwrap_or(name)),
                    team_id: team_id.clone(),
                    photo: String::new(),
                },
            )?;
        }

        team_ids.push(team_id);
    }

    let season_start =
        NaiveDate::from_ymd_opt(2026, 8, 8).ok_or("invalid season start")?;
    let fixtures = round_robin(n_teams);

    for (k, (round, home, away)) in fixtures.iter().enumerate() {
        let date = season_start
            .checked_add_days(Days::new(7 * *round as u64))
            .ok_or("season runs past the end of the calendar")?;

        let id = commands::add_match(
            &store,
            &admin,
            NewMatch {
                home_team_id: team_ids[*home].clone(),
                away_team_id: team_ids[*away].clone(),
                date,
            },
        )?;

        if k < args.played {
            // arbitrary, but stable between runs
            let score = Score::new(
                ((k * 7 + home * 3) % 5) as u32,
                ((k * 5 + away * 2) % 4) as u32,
            );
            commands::update_score(&store, &admin, &id, Some(score))?;
        }
    }

    println!(
        "created {n_teams} teams, {} players and {} matches ({} played)",
        n_teams * PLAYERS_PER_TEAM,
        fixtures.len(),
        args.played.min(fixtures.len()),
    );

    Ok(())
}

/// A single round robin as `(round, home, away)`, using the circle method.
/// With an odd number of teams one team sits out each round.
fn round_robin(n: usize) -> Vec<(usize, usize, usize)> {
    let slots = n + n % 2;
    let mut fixtures = Vec::new();

    for round in 0..slots - 1 {
        for i in 0..slots / 2 {
            let a = if i == 0 { 0 } else { 1 + (round + i - 1) % (slots - 1) };
            let b = 1 + (round + slots - 2 - i) % (slots - 1);
            if a >= n || b >= n {
                continue;
            }
            let (home, away) = if round % 2 == 0 { (a, b) } else { (b, a) };
            fixtures.push((round, home, away));
        }
    }

    fixtures
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::round_robin;

    #[test]
    fn every_pair_meets_exactly_once() {
        for n in 2..=12 {
            let fixtures = round_robin(n);
            assert_eq!(fixtures.len(), n * (n - 1) / 2, "n = {n}");

            let mut met = HashSet::new();
            for &(_, home, away) in &fixtures {
                assert!(home < n && away < n, "n = {n}: team out of range");
                assert_ne!(home, away, "n = {n}: a team played itself");
                assert!(
                    met.insert((home.min(away), home.max(away))),
                    "n = {n}: {home} and {away} met twice"
                );
            }
        }
    }

    #[test]
    fn nobody_plays_twice_in_a_round() {
        for n in 2..=12 {
            let fixtures = round_robin(n);
            let rounds = fixtures.iter().map(|f| f.0).max().map_or(0, |r| r + 1);
            assert_eq!(rounds, n + n % 2 - 1, "n = {n}");

            let mut seen: HashMap<usize, HashSet<usize>> = HashMap::new();
            for &(round, home, away) in &fixtures {
                let teams = seen.entry(round).or_default();
                assert!(teams.insert(home), "n = {n}: {home} twice in {round}");
                assert!(teams.insert(away), "n = {n}: {away} twice in {round}");
            }
        }
    }
}
