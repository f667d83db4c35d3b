use anyhow::{Context, bail};
use best6::app::App;
use best6::leaderboard::ranked;
use best6::round::{monthly_points, weekly_points};
use best6::runtime::Runtime;
use best6::scoring::Side;
use best6::state::app_settings::AppSettings;
use best6::sync::Collection;
use chrono::Utc;
use log::LevelFilter;
use std::time::Duration;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

enum Command {
    Status,
    Save { minute: String, picks: Vec<(u64, u8, u8)> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(command) = handle_cli_args()? else {
        return Ok(());
    };

    better_panic::install();

    let settings = AppSettings::load();
    let level = settings.log_level.unwrap_or(LevelFilter::Warn);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();

    let has_backend = settings.supabase.is_some();
    let mut runtime = Runtime::start(settings);
    let report = runtime.bootstrap().await;
    if has_backend && !report.is_complete() {
        eprintln!("sync unavailable for: {:?}", report.failed);
    }
    runtime.settle(SETTLE_TIMEOUT).await;

    {
        let mut app = runtime.app.lock().await;
        match command {
            Command::Status => print_status(&app),
            Command::Save { minute, picks } => {
                save(&mut app, &minute, &picks)?;
                print_status(&app);
                drop(app);
                runtime
                    .flush(&[Collection::Predictions, Collection::Rounds, Collection::Leaderboard])
                    .await;
            }
        }
    }

    runtime.shutdown().await;
    Ok(())
}

fn handle_cli_args() -> anyhow::Result<Option<Command>> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(Some(Command::Status));
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(None)
        }
        "-V" | "--version" => {
            println!("best6 {}", env!("CARGO_PKG_VERSION"));
            Ok(None)
        }
        "status" => Ok(Some(Command::Status)),
        "save" => {
            let minute = args.next().context("save needs a first-goal minute")?;
            let picks = args.map(|pick| parse_pick(&pick)).collect::<anyhow::Result<_>>()?;
            Ok(Some(Command::Save { minute, picks }))
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// `101=2-1` → (101, 2, 1)
fn parse_pick(raw: &str) -> anyhow::Result<(u64, u8, u8)> {
    let (id, score) = raw.split_once('=').with_context(|| format!("bad pick {raw:?}"))?;
    let (home, away) = score.split_once('-').with_context(|| format!("bad score in {raw:?}"))?;
    Ok((id.parse()?, home.parse()?, away.parse()?))
}

fn save(app: &mut App, minute: &str, picks: &[(u64, u8, u8)]) -> anyhow::Result<()> {
    let now = Utc::now();
    for &(match_id, home, away) in picks {
        for (side, target) in [(Side::Home, home), (Side::Away, away)] {
            let current = app.state.play.predictions.get(&match_id).and_then(|p| match side {
                Side::Home => p.home,
                Side::Away => p.away,
            });
            let delta = i16::from(target) - i16::from(current.unwrap_or(0));
            let Ok(delta) = i8::try_from(delta) else {
                bail!("score {target} is out of range");
            };
            if delta != 0 || current.is_none() {
                app.adjust_prediction(match_id, side, delta, now)?;
            }
        }
    }
    app.state.play.first_goal_input = minute.to_owned();
    let round = app.save_round(now)?;
    println!("Saved matchday {} for {} point(s).", round.matchday, round.total_points);
    Ok(())
}

fn print_status(app: &App) {
    let play = &app.state.play;
    if let Some(banner) = &app.state.banner {
        println!("! {banner}");
    }
    println!("Matchday {} ({:?} slate)", play.matchday(app.settings.matchday), play.source);
    for m in &play.matches {
        let guess = play
            .predictions
            .get(&m.id)
            .map(|p| p.or_zero())
            .map(|s| format!("{}-{}", s.home, s.away))
            .unwrap_or_else(|| "-".into());
        let result = m
            .result()
            .map(|r| format!("{}-{}", r.home, r.away))
            .unwrap_or_else(|| "vs".into());
        let position = |team_id: &str| {
            app.state
                .standings
                .position_of(team_id)
                .map(|p| format!(" ({p})"))
                .unwrap_or_default()
        };
        println!(
            "  {:>8}  {}{} {} {}{}  [{}]  your pick {}",
            m.id,
            m.home_team.name,
            position(&m.home_team.id),
            result,
            m.away_team.name,
            position(&m.away_team.id),
            m.utc_date.format("%b %d %H:%M"),
            guess,
        );
        let form = |team_id: &str| -> String {
            app.form_of(team_id).iter().map(|line| line.outcome.letter()).collect()
        };
        let meetings = app.meetings(m);
        let last = meetings
            .first()
            .and_then(|met| {
                let r = met.result()?;
                Some(format!(
                    ", last {} {}-{} {}",
                    met.home_team.name, r.home, r.away, met.away_team.name
                ))
            })
            .unwrap_or_default();
        println!(
            "            form {} / {}  h2h {} meeting(s){}",
            form(&m.home_team.id),
            form(&m.away_team.id),
            meetings.len(),
            last
        );
    }
    println!("Live points: {}", play.live_points());

    let now = Utc::now();
    let rounds = &app.state.rounds;
    println!(
        "Rounds: {}  week {}  month {}",
        rounds.len(),
        weekly_points(rounds, now),
        monthly_points(rounds, now)
    );
    let matchday = play.matchday(app.settings.matchday);
    if rounds.iter().any(|r| r.matchday == matchday) {
        println!("Matchday {matchday} table:");
        for (rank, standing) in app.round_table(matchday, None).iter().enumerate() {
            let name = app
                .state
                .leaderboard
                .iter()
                .find(|e| e.id == standing.player_id)
                .map_or(standing.player_id.as_str(), |e| e.name.as_str());
            println!("  {:>2}. {:<16} {:>4}", rank + 1, name, standing.points);
        }
    }
    println!("Season:");
    for (rank, entry) in ranked(&app.state.leaderboard).into_iter().enumerate() {
        println!("  {:>2}. {:<16} {:>4}", rank + 1, entry.name, entry.total_points);
    }
    for league in &app.state.leagues {
        println!("  league {} [{}] {} member(s)", league.name, league.code, league.members);
    }
}

fn usage_text() -> &'static str {
    "best6 - pick six scores, settle the round, climb the table

Usage:
  best6 [status]
  best6 save <first-goal-minute> [<match-id>=<home>-<away> ...]
  best6 --help
  best6 --version

Environment:
  BEST6_DATA_DIR             Where local data lives (default $XDG_DATA_HOME/best6)
  BEST6_FOOTBALL_API_KEY     football-data.org key for live fixtures
  BEST6_FOOTBALL_PROXY_URL   Fixtures proxy (takes precedence over the key)
  BEST6_COMPETITION          Competition code (default PL)
  BEST6_MATCHDAY             Matchday to play (default 19)
  BEST6_SLATE_DATE           Only fixtures on this day, YYYY-MM-DD
  BEST6_SUPABASE_URL         Backend URL for sync
  BEST6_SUPABASE_ANON_KEY    Backend anon key
  BEST6_AUTH                 bypass | supabase
  BEST6_LOG                  Log level (error, warn, info, debug, trace)"
}
