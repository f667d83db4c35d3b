use crate::auth::IdentityProvider;
use crate::error::{Error, Result, StoreResult, ValidationError};
use crate::leaderboard::{LeaderboardEntry, RoundStanding, rank_round, with_player_totals};
use crate::league::League;
use crate::round::{FirstGoalMinute, RoundResult, build_round, cap_round_totals};
use crate::sample::sample_matches;
use crate::scoring::Side;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Phase, PlayState, SlateSource};
use crate::state::messages::NetworkRequest;
use crate::store::{Language, LocalStore};
use crate::sync::Collection;
use crate::sync::worker::SyncHandle;
use chrono::{DateTime, Utc};
use football_data_api::client::season_for;
use football_data_api::{
    FormLine, Match, SLATE_SIZE, Standings, head_to_head, recent_form, select_slate,
};
use log::{debug, info, warn};
use std::sync::Arc;

/// How many finished matches to pull per team for recent form.
pub const RECENT_FORM_LIMIT: u32 = 5;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    store: Arc<LocalStore>,
    sync: SyncHandle,
    identity: Arc<dyn IdentityProvider>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        store: Arc<LocalStore>,
        sync: SyncHandle,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        if let Some(level) = settings.log_level {
            log::set_max_level(level);
        }

        let mut state = AppState::from_store(&store);
        let cached = store.load_matches();
        if cached.is_empty() {
            state.play.matches = sample_matches(Utc::now());
            state.play.source = SlateSource::Sample;
        } else {
            state.play.matches = cached;
            state.play.source = SlateSource::Cached;
        }

        Self { settings, state, store, sync, identity }
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// Re-read everything after a bootstrap merged remote data into the store.
    pub fn reload_from_store(&mut self) {
        self.state.reload(&self.store);
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    /// Clamp round totals stored before the cap existed. When anything changed
    /// the "you" entry is recomputed and both collections are pushed.
    pub fn migrate_round_caps(&mut self, now: DateTime<Utc>) -> StoreResult<bool> {
        let mut changed = false;
        let rounds = self.store.update_rounds(|mut rounds| {
            changed = cap_round_totals(&mut rounds);
            rounds
        })?;
        if !changed {
            return Ok(false);
        }
        info!("capped stored round totals");
        self.state.rounds = rounds;
        self.refresh_leaderboard(now)?;
        self.sync.push(Collection::Rounds);
        self.sync.push(Collection::Leaderboard);
        Ok(true)
    }

    /// Requests the play screen issues when it opens.
    pub fn startup_requests(&self, now: DateTime<Utc>) -> Vec<NetworkRequest> {
        if self.settings.fixtures.is_none() {
            return Vec::new();
        }
        let competition = self.settings.competition.clone();
        vec![
            NetworkRequest::LoadFixtures {
                competition: competition.clone(),
                matchday: self.settings.matchday,
            },
            NetworkRequest::LoadStandings { competition, season: season_for(now) },
        ]
    }

    // -----------------------------------------------------------------------
    // Network responses
    // -----------------------------------------------------------------------

    /// Build the slate from freshly loaded fixtures. If the current slate is the
    /// same matchday and every match is still listed, it is refreshed in place so
    /// results land on the fixtures already being predicted.
    pub fn on_fixtures_loaded(&mut self, matchday: u32, matches: Vec<Match>) -> StoreResult<()> {
        let same_slate = self.state.play.source != SlateSource::Sample
            && !self.state.play.matches.is_empty()
            && self.state.play.matches.iter().all(|current| {
                current.matchday == Some(matchday) && matches.iter().any(|m| m.id == current.id)
            });

        let slate = if same_slate {
            self.state
                .play
                .matches
                .iter()
                .filter_map(|current| matches.iter().find(|m| m.id == current.id).cloned())
                .collect()
        } else {
            select_slate(matches, self.settings.slate_date, SLATE_SIZE, &mut rand::rng())
        };

        if slate.is_empty() {
            self.on_fixture_error("No matches found for the selected date.".into());
            return Ok(());
        }

        debug!("slate for matchday {matchday}: {} match(es)", slate.len());
        self.store.save_matches(&slate)?;
        self.state.play.matches = slate;
        self.state.play.source = SlateSource::Live;
        self.state.banner = None;
        Ok(())
    }

    /// Keep whatever slate is showing; fall back to the cache, then the sample
    /// slate, only when there is nothing to play.
    pub fn on_fixture_error(&mut self, message: String) {
        warn!("fixtures unavailable: {message}");
        self.state.banner = Some(message);
        if !self.state.play.matches.is_empty() {
            return;
        }
        let cached = self.store.load_matches();
        if cached.is_empty() {
            self.state.play.matches = sample_matches(Utc::now());
            self.state.play.source = SlateSource::Sample;
        } else {
            self.state.play.matches = cached;
            self.state.play.source = SlateSource::Cached;
        }
    }

    pub fn on_standings_loaded(&mut self, standings: Standings) {
        self.state.standings = standings;
    }

    pub fn on_team_results_loaded(&mut self, team_id: String, matches: Vec<Match>) {
        self.state.team_results.insert(team_id, matches);
    }

    /// Recent-form requests for teams on the slate we have no results for yet.
    pub fn missing_form_requests(&self) -> Vec<NetworkRequest> {
        if self.settings.fixtures.is_none() {
            return Vec::new();
        }
        let mut team_ids: Vec<&str> = self
            .state
            .play
            .matches
            .iter()
            .flat_map(|m| [m.home_team.id.as_str(), m.away_team.id.as_str()])
            .filter(|id| !self.state.team_results.contains_key(*id))
            .collect();
        team_ids.sort_unstable();
        team_ids.dedup();
        team_ids
            .into_iter()
            .map(|team_id| NetworkRequest::LoadTeamResults {
                team_id: team_id.to_owned(),
                limit: RECENT_FORM_LIMIT,
            })
            .collect()
    }

    /// Recent results of a team, newest first, from whatever form was loaded.
    pub fn form_of(&self, team_id: &str) -> Vec<FormLine> {
        self.state
            .team_results
            .get(team_id)
            .map(|history| recent_form(history, team_id))
            .unwrap_or_default()
    }

    /// Earlier meetings of the fixture's two sides found in either team's history.
    pub fn meetings(&self, fixture: &Match) -> Vec<&Match> {
        let home = fixture.home_team.id.as_str();
        let away = fixture.away_team.id.as_str();
        let mut found: Vec<&Match> = [home, away]
            .iter()
            .filter_map(|id| self.state.team_results.get(*id))
            .flat_map(|history| head_to_head(history, home, away))
            .filter(|m| m.id != fixture.id)
            .collect();
        found.sort_by(|a, b| b.utc_date.cmp(&a.utc_date).then_with(|| a.id.cmp(&b.id)));
        found.dedup_by_key(|m| m.id);
        found
    }

    // -----------------------------------------------------------------------
    // Play: editing and settlement
    // -----------------------------------------------------------------------

    /// Step one side of a prediction. Refused once picks are locked or the
    /// match has kicked off.
    pub fn adjust_prediction(
        &mut self,
        match_id: u64,
        side: Side,
        delta: i8,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), ValidationError> {
        let play = &mut self.state.play;
        if play.is_locked() {
            return Err(ValidationError::RoundLocked);
        }
        let fixture = play.find_match(match_id).ok_or(ValidationError::UnknownMatch(match_id))?;
        if fixture.kickoff_passed(now) {
            return Err(ValidationError::KickoffPassed(match_id));
        }
        let current = play.predictions.get(&match_id).copied().unwrap_or_default();
        play.predictions.insert(match_id, current.adjusted(side, delta));
        play.notice = None;
        Ok(())
    }

    /// Validate the tie-breaker, persist predictions and the scored round,
    /// recompute the leaderboard and lock. A validation or storage failure
    /// leaves the phase unchanged. Saving while locked is refused; unlock first.
    pub fn save_round(&mut self, now: DateTime<Utc>) -> Result<RoundResult> {
        let play = &mut self.state.play;
        if play.is_locked() {
            return Err(ValidationError::RoundLocked.into());
        }
        play.validation_error = None;
        play.notice = None;

        let first_goal_minute = match FirstGoalMinute::parse(&play.first_goal_input) {
            Ok(minute) => minute,
            Err(e) => {
                play.validation_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.store.save_predictions(&self.state.play.predictions)?;
        self.sync.push(Collection::Predictions);

        let matchday = self.state.play.matchday(self.settings.matchday);
        let round = build_round(
            matchday,
            &self.state.play.matches,
            &self.state.play.predictions,
            first_goal_minute,
            now,
        );
        self.state.rounds = self.store.save_round_result(round.clone())?;
        self.refresh_leaderboard(now)?;
        self.sync.push(Collection::Rounds);
        self.sync.push(Collection::Leaderboard);

        info!("saved matchday {matchday} for {} point(s)", round.total_points);
        self.state.play.phase = Phase::Locked;
        self.state.play.notice = Some("Picks saved.".into());
        Ok(round)
    }

    /// Back to editing. The saved round stays until the next save replaces it.
    pub fn unlock(&mut self) {
        self.state.play.phase = Phase::Editing;
        self.state.play.notice = None;
    }

    fn refresh_leaderboard(&mut self, now: DateTime<Utc>) -> StoreResult<()> {
        let rounds = &self.state.rounds;
        self.state.leaderboard = self
            .store
            .update_leaderboard(|entries| with_player_totals(entries, rounds, now))?;
        Ok(())
    }

    /// Table for one matchday: your saved round against the other players'
    /// weekly points. Ties go to the first-goal guess nearest `actual_first_goal`.
    pub fn round_table(&self, matchday: u32, actual_first_goal: Option<u8>) -> Vec<RoundStanding> {
        let mine = self.state.rounds.iter().find(|r| r.matchday == matchday);
        let mut table: Vec<RoundStanding> = self
            .state
            .leaderboard
            .iter()
            .map(|entry| match (entry.is_you(), mine) {
                (true, Some(round)) => RoundStanding {
                    player_id: entry.id.clone(),
                    points: round.total_points,
                    first_goal_minute: round.first_goal_minute,
                },
                (true, None) => RoundStanding {
                    player_id: entry.id.clone(),
                    points: 0,
                    first_goal_minute: None,
                },
                (false, _) => RoundStanding {
                    player_id: entry.id.clone(),
                    points: entry.weekly_points,
                    first_goal_minute: None,
                },
            })
            .collect();
        rank_round(&mut table, actual_first_goal);
        table
    }

    pub fn you(&self) -> Option<&LeaderboardEntry> {
        self.state.leaderboard.iter().find(|e| e.is_you())
    }

    // -----------------------------------------------------------------------
    // Leagues, profile, settings, session
    // -----------------------------------------------------------------------

    pub fn create_league(&mut self, name: &str, code: &str, now: DateTime<Utc>) -> Result<League> {
        let league = League::create(name, code, now, &mut rand::rng())?;
        self.add_league(league)
    }

    pub fn join_league(&mut self, code: &str, now: DateTime<Utc>) -> Result<League> {
        let league = League::join(code, now)?;
        self.add_league(league)
    }

    fn add_league(&mut self, league: League) -> Result<League> {
        let added = league.clone();
        self.state.leagues = self.store.update_leagues(|mut leagues| {
            leagues.insert(0, league);
            leagues
        })?;
        self.sync.push(Collection::Leagues);
        Ok(added)
    }

    pub fn set_profile_name(&mut self, name: &str) -> StoreResult<()> {
        let name = name.trim();
        self.store.save_profile_name(name)?;
        self.state.profile_name = name.to_owned();
        self.sync.push(Collection::Profile);
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) -> StoreResult<()> {
        self.store.save_language(language)?;
        self.state.language = language;
        Ok(())
    }

    /// Wipe local app data, then end the remote session. The cached slate goes
    /// with it, so play restarts on the sample slate.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.store.clear_app_data()?;
        self.state.play = PlayState {
            matches: sample_matches(Utc::now()),
            source: SlateSource::Sample,
            ..PlayState::default()
        };
        self.state.reload(&self.store);
        self.identity.sign_out().await.map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BypassAuth;
    use crate::scoring::Prediction;
    use crate::sync::worker::SyncRequest;
    use chrono::{Duration, TimeZone};
    use football_data_api::{FullTime, MatchScore, MatchStatus, Team};
    use tokio::sync::mpsc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 30, 18, 0, 0).unwrap()
    }

    fn fixture(id: u64, kickoff_hours: i64, result: Option<(u8, u8)>) -> Match {
        Match {
            id,
            utc_date: now() + Duration::hours(kickoff_hours),
            status: if result.is_some() { MatchStatus::Finished } else { MatchStatus::Timed },
            matchday: Some(19),
            home_team: Team { id: format!("{id}0"), name: "Home".into(), ..Default::default() },
            away_team: Team { id: format!("{id}1"), name: "Away".into(), ..Default::default() },
            score: result.map(|(home, away)| MatchScore {
                full_time: Some(FullTime { home: Some(home), away: Some(away) }),
            }),
        }
    }

    fn app() -> (App, mpsc::Receiver<SyncRequest>) {
        let (tx, rx) = mpsc::channel(32);
        let app = App::new(
            AppSettings::default(),
            Arc::new(LocalStore::in_memory()),
            SyncHandle::new(tx),
            Arc::new(BypassAuth::new()),
        );
        (app, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<SyncRequest>) -> Vec<SyncRequest> {
        let mut out = Vec::new();
        while let Ok(request) = rx.try_recv() {
            out.push(request);
        }
        out
    }

    #[test]
    fn fresh_app_plays_the_sample_slate() {
        let (app, _rx) = app();
        assert_eq!(app.state.play.source, SlateSource::Sample);
        assert_eq!(app.state.play.matches.len(), 6);
        assert!(app.startup_requests(now()).is_empty());
    }

    #[test]
    fn editing_clamps_and_respects_kickoff() {
        let (mut app, _rx) = app();
        app.state.play.matches = vec![fixture(1, 2, None), fixture(2, -1, None)];

        app.adjust_prediction(1, Side::Home, 1, now()).unwrap();
        app.adjust_prediction(1, Side::Away, -1, now()).unwrap();
        for _ in 0..12 {
            app.adjust_prediction(1, Side::Home, 1, now()).unwrap();
        }
        assert_eq!(app.state.play.predictions[&1], Prediction::new(9, 0));

        assert_eq!(app.adjust_prediction(2, Side::Home, 1, now()), Err(ValidationError::KickoffPassed(2)));
        assert_eq!(app.adjust_prediction(9, Side::Home, 1, now()), Err(ValidationError::UnknownMatch(9)));
    }

    #[test]
    fn invalid_tie_breaker_changes_nothing() {
        let (mut app, mut rx) = app();
        app.state.play.first_goal_input = "121".into();

        let err = app.save_round(now()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::FirstGoalMinute)));
        assert_eq!(app.state.play.phase, Phase::Editing);
        assert!(app.state.play.validation_error.is_some());
        assert!(app.store.load_rounds().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn save_locks_scores_and_pushes() {
        let (mut app, mut rx) = app();
        app.state.play.matches = vec![fixture(1, -3, Some((2, 0))), fixture(2, -3, Some((1, 2)))];
        app.state.play.predictions.insert(1, Prediction::new(2, 0));
        app.state.play.first_goal_input = " 33 ".into();

        let round = app.save_round(now()).unwrap();
        assert_eq!(round.total_points, 5);
        assert_eq!(round.matchday, 19);
        assert_eq!(app.state.play.phase, Phase::Locked);
        assert_eq!(app.store.load_rounds(), vec![round]);
        assert_eq!(app.you().map(|y| y.total_points), Some(5));
        assert_eq!(app.store.load_leaderboard(), app.state.leaderboard);
        assert_eq!(
            drain(&mut rx),
            vec![
                SyncRequest::Push(Collection::Predictions),
                SyncRequest::Push(Collection::Rounds),
                SyncRequest::Push(Collection::Leaderboard),
            ]
        );

        assert_eq!(app.adjust_prediction(1, Side::Home, 1, now()), Err(ValidationError::RoundLocked));
        app.unlock();
        assert_eq!(app.state.play.phase, Phase::Editing);
        assert_eq!(app.store.load_rounds().len(), 1);
    }

    #[test]
    fn saving_again_while_locked_is_refused() {
        let (mut app, mut rx) = app();
        app.state.play.matches = vec![fixture(1, -3, Some((2, 0)))];
        app.state.play.predictions.insert(1, Prediction::new(2, 0));
        app.state.play.first_goal_input = "20".into();
        let saved = app.save_round(now()).unwrap();
        drain(&mut rx);

        app.state.play.first_goal_input = "99".into();
        let err = app.save_round(now() + Duration::seconds(5)).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::RoundLocked)));
        assert_eq!(app.state.play.phase, Phase::Locked);
        assert_eq!(app.store.load_rounds(), vec![saved.clone()]);
        assert_eq!(app.state.rounds, vec![saved]);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn resaving_a_matchday_replaces_its_round() {
        let (mut app, _rx) = app();
        app.state.play.matches = vec![fixture(1, -3, Some((2, 0)))];
        app.state.play.predictions.insert(1, Prediction::new(1, 0));
        app.save_round(now()).unwrap();
        app.unlock();
        app.state.play.predictions.insert(1, Prediction::new(2, 0));
        app.save_round(now() + Duration::minutes(1)).unwrap();

        assert_eq!(app.state.rounds.len(), 1);
        assert_eq!(app.you().map(|y| y.total_points), Some(5));
    }

    #[test]
    fn cap_migration_recomputes_and_pushes() {
        let (mut app, mut rx) = app();
        app.store
            .save_rounds(&[RoundResult {
                id: "round-1".into(),
                created_at: now(),
                matchday: 3,
                picks: vec![],
                total_points: 44,
                first_goal_minute: None,
            }])
            .unwrap();

        assert!(app.migrate_round_caps(now()).unwrap());
        assert_eq!(app.you().map(|y| y.total_points), Some(30));
        assert_eq!(drain(&mut rx).len(), 2);
        assert!(!app.migrate_round_caps(now()).unwrap());
    }

    #[test]
    fn reloading_the_same_matchday_keeps_the_slate() {
        let (mut app, _rx) = app();
        let fresh: Vec<Match> = (1..=9).map(|id| fixture(id, 1, None)).collect();
        app.on_fixtures_loaded(19, fresh.clone()).unwrap();
        assert_eq!(app.state.play.source, SlateSource::Live);
        let slate: Vec<u64> = app.state.play.matches.iter().map(|m| m.id).collect();
        assert_eq!(slate.len(), 6);

        let finished: Vec<Match> = fresh.into_iter().map(|m| Match { status: MatchStatus::Finished, ..m }).collect();
        app.on_fixtures_loaded(19, finished).unwrap();
        let reloaded: Vec<u64> = app.state.play.matches.iter().map(|m| m.id).collect();
        assert_eq!(reloaded, slate);
        assert!(app.state.play.matches.iter().all(|m| m.status == MatchStatus::Finished));
        assert_eq!(app.store.load_matches(), app.state.play.matches);
    }

    #[test]
    fn fixture_errors_keep_the_current_slate() {
        let (mut app, _rx) = app();
        app.state.play.matches = vec![fixture(1, 1, None)];
        app.on_fixture_error("Fixtures request failed".into());
        assert_eq!(app.state.banner.as_deref(), Some("Fixtures request failed"));
        assert_eq!(app.state.play.matches.len(), 1);

        app.state.play.matches.clear();
        app.store.save_matches(&[fixture(7, 1, None)]).unwrap();
        app.on_fixture_error("offline".into());
        assert_eq!(app.state.play.source, SlateSource::Cached);
        assert_eq!(app.state.play.matches[0].id, 7);
    }

    #[test]
    fn leagues_are_prepended_and_pushed() {
        let (mut app, mut rx) = app();
        app.join_league("B6-404", now()).unwrap();
        let created = app.create_league("Office", "", now() + Duration::seconds(1)).unwrap();
        assert_eq!(app.state.leagues[0], created);
        assert_eq!(app.store.load_leagues().len(), 2);
        assert_eq!(drain(&mut rx), vec![SyncRequest::Push(Collection::Leagues); 2]);

        assert!(matches!(
            app.create_league(" ", "", now()),
            Err(Error::Validation(ValidationError::LeagueNameRequired))
        ));
    }

    #[tokio::test]
    async fn sign_out_clears_local_data() {
        let (mut app, _rx) = app();
        app.set_profile_name(" Sam ").unwrap();
        app.set_language(Language::Ku).unwrap();
        app.store.save_user_id("device").unwrap();
        assert_eq!(app.state.profile_name, "Sam");

        app.store.save_matches(&[fixture(7, 1, None)]).unwrap();
        app.state.play.matches = app.store.load_matches();
        app.state.play.source = SlateSource::Cached;
        app.state.play.phase = Phase::Locked;

        app.sign_out().await.unwrap();
        assert_eq!(app.state.profile_name, "");
        assert_eq!(app.state.play.source, SlateSource::Sample);
        assert_eq!(app.state.play.matches.len(), 6);
        assert_eq!(app.state.play.phase, Phase::Editing);
        assert!(app.store.load_matches().is_empty());
        assert_eq!(app.state.language, Language::En);
        assert_eq!(app.store.load_user_id().as_deref(), Some("device"));
        assert!(!app.identity.is_authenticated());
    }

    #[test]
    fn form_and_meetings_come_from_loaded_results() {
        let (mut app, _rx) = app();
        let upcoming = fixture(1, 1, None);
        let mut old_meeting = fixture(2, -200, Some((0, 3)));
        old_meeting.home_team = upcoming.away_team.clone();
        old_meeting.away_team = upcoming.home_team.clone();
        let mut other_game = fixture(3, -100, Some((1, 1)));
        other_game.home_team = upcoming.home_team.clone();

        app.on_team_results_loaded("10".into(), vec![old_meeting.clone(), other_game]);
        app.on_team_results_loaded("11".into(), vec![old_meeting]);

        let form: String = app.form_of("10").iter().map(|f| f.outcome.letter()).collect();
        assert_eq!(form, "DW");
        assert!(app.form_of("99").is_empty());

        let meetings: Vec<u64> = app.meetings(&upcoming).iter().map(|m| m.id).collect();
        assert_eq!(meetings, vec![2]);
    }

    #[test]
    fn round_table_breaks_ties_on_the_first_goal_guess() {
        let (mut app, _rx) = app();
        app.state.play.matches = vec![fixture(1, -3, Some((2, 0)))];
        app.state.play.predictions.insert(1, Prediction::new(2, 0));
        app.state.play.first_goal_input = "30".into();
        app.save_round(now()).unwrap();
        app.state.leaderboard.push(LeaderboardEntry {
            id: "r1".into(),
            name: "Rival".into(),
            total_points: 40,
            weekly_points: 5,
            avatar_color: None,
            predictions: None,
        });

        let order = |actual| {
            app.round_table(19, actual)
                .into_iter()
                .map(|s| s.player_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(order(Some(28)), vec!["you", "r1"]);
        assert_eq!(app.round_table(19, Some(28))[0].points, 5);
        assert_eq!(app.round_table(3, None)[0].player_id, "r1");
    }

    #[test]
    fn form_requests_skip_known_teams() {
        let (mut app, _rx) = app();
        app.settings.fixtures = Some(football_data_api::client::Endpoint::Proxy { url: "http://p".into() });
        app.state.play.matches = vec![fixture(1, 1, None)];
        app.on_team_results_loaded("10".into(), vec![]);
        assert_eq!(
            app.missing_form_requests(),
            vec![NetworkRequest::LoadTeamResults { team_id: "11".into(), limit: RECENT_FORM_LIMIT }]
        );
    }
}
