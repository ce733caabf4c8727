//! Game session state and its update rules
//!
//! `GameSessionState` is plain data. Every change goes through
//! [`GameSessionState::apply`], which mutates the state and returns the
//! side effects (presentation, persistence, timers) for the session actor
//! to carry out. Nothing in here touches a runtime.

use std::time::Duration;

use scramble_protocol::PlayerScore;

use crate::ports::outbound::{storage_keys, ConnectionState, GameOutcome, Notice};

/// How long right/wrong feedback stays visible.
pub const FEEDBACK_VISIBLE: Duration = Duration::from_secs(2);
/// Delay between game over and leaving the game screen.
pub const LEAVE_AFTER_GAME_OVER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub feedback_visible: Duration,
    pub leave_after_game_over: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            feedback_visible: FEEDBACK_VISIBLE,
            leave_after_game_over: LEAVE_AFTER_GAME_OVER,
        }
    }
}

/// Everything that may change the session, from any source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// `/start` succeeded
    GameStarted { player_id: String, word: String },
    /// `/submit` said yes; the server may omit the next word
    CorrectGuess { new_word: Option<String> },
    /// `/submit` said no
    IncorrectGuess,
    /// Roster from the server (push or `/submit`)
    Roster(Vec<PlayerScore>),
    /// Cached roster replayed on reconnect
    RosterReplayed(Vec<PlayerScore>),
    GameOver { winner: String },
    ConnectionChanged(ConnectionState),
    Notice(Notice),
    /// Timer: feedback visibility elapsed
    HideFeedback,
    /// Timer: game-over delay elapsed
    LeaveGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Playing,
    /// Terminal until the next game is started
    Over(GameOutcome),
}

/// What the presenter should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Unscrambled; scrambled at render time
    Word(String),
    GuessFeedback(bool),
    HideGuessFeedback,
    Roster(Vec<PlayerScore>),
    GameOver(GameOutcome),
    LeaveGame,
    Notice(Notice),
    Connection(ConnectionState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Present(Presentation),
    Persist { key: &'static str, value: String },
    Schedule { after: Duration, update: SessionUpdate },
}

/// Client-side view of one game session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSessionState {
    player_id: Option<String>,
    username: Option<String>,
    current_word: Option<String>,
    roster: Vec<PlayerScore>,
    /// Last status reported by the push channel
    connection: ConnectionState,
    phase: GamePhase,
    timings: SessionTimings,
}

impl GameSessionState {
    pub fn new(timings: SessionTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    pub fn with_identity(mut self, username: Option<String>, player_id: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.player_id = player_id.filter(|p| !p.is_empty());
        self
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn roster(&self) -> &[PlayerScore] {
        &self.roster
    }

    pub fn connection_status(&self) -> ConnectionState {
        self.connection
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Over(_))
    }

    /// Refresh the username used to decide who won.
    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username.filter(|u| !u.is_empty());
    }

    pub fn apply(&mut self, update: SessionUpdate) -> Vec<Effect> {
        match update {
            SessionUpdate::GameStarted { player_id, word } => self.apply_started(player_id, word),
            SessionUpdate::CorrectGuess { new_word } => self.apply_correct_guess(new_word),
            SessionUpdate::IncorrectGuess => self.apply_incorrect_guess(),
            SessionUpdate::Roster(roster) => self.apply_roster_update(roster),
            SessionUpdate::RosterReplayed(roster) => self.apply_roster_replay(roster),
            SessionUpdate::GameOver { winner } => self.apply_game_over(winner),
            SessionUpdate::ConnectionChanged(state) => {
                self.connection = state;
                vec![Effect::Present(Presentation::Connection(state))]
            }
            SessionUpdate::Notice(notice) => vec![Effect::Present(Presentation::Notice(notice))],
            SessionUpdate::HideFeedback => {
                vec![Effect::Present(Presentation::HideGuessFeedback)]
            }
            SessionUpdate::LeaveGame => {
                if self.is_over() {
                    vec![Effect::Present(Presentation::LeaveGame)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn apply_started(&mut self, player_id: String, word: String) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !player_id.is_empty() {
            effects.push(Effect::Persist {
                key: storage_keys::PLAYER_ID,
                value: player_id.clone(),
            });
            self.player_id = Some(player_id);
        }
        self.phase = GamePhase::Playing;
        self.current_word = Some(word.clone());
        effects.push(Effect::Present(Presentation::Word(word)));
        effects
    }

    /// Replace the word and re-render. Ignored once the game is over.
    pub fn apply_correct_guess(&mut self, new_word: Option<String>) -> Vec<Effect> {
        if self.is_over() {
            tracing::debug!("Ignoring guess result after game over");
            return Vec::new();
        }

        let mut effects = Vec::new();
        match new_word.filter(|w| !w.is_empty()) {
            Some(word) => {
                self.current_word = Some(word.clone());
                effects.push(Effect::Present(Presentation::Word(word)));
            }
            None => tracing::warn!("Correct guess without a new word, keeping current word"),
        }
        effects.extend(self.feedback(true));
        effects
    }

    pub fn apply_incorrect_guess(&mut self) -> Vec<Effect> {
        if self.is_over() {
            tracing::debug!("Ignoring guess result after game over");
            return Vec::new();
        }
        self.feedback(false)
    }

    /// Replace the roster wholesale and cache it.
    pub fn apply_roster_update(&mut self, roster: Vec<PlayerScore>) -> Vec<Effect> {
        let mut effects = Vec::new();
        match serde_json::to_string(&roster) {
            Ok(value) => effects.push(Effect::Persist {
                key: storage_keys::PLAYER_LIST,
                value,
            }),
            Err(e) => tracing::warn!("Failed to serialize roster for cache: {}", e),
        }
        effects.extend(self.apply_roster_replay(roster));
        effects
    }

    fn apply_roster_replay(&mut self, roster: Vec<PlayerScore>) -> Vec<Effect> {
        self.roster = roster;
        vec![Effect::Present(Presentation::Roster(self.roster.clone()))]
    }

    /// Enter the terminal state. A second game over is ignored.
    ///
    /// The local player won only if the stored username equals `winner`
    /// exactly (case-sensitive).
    pub fn apply_game_over(&mut self, winner: String) -> Vec<Effect> {
        if self.is_over() {
            tracing::debug!(winner = %winner, "Ignoring repeated game over");
            return Vec::new();
        }

        let outcome = if self.username.as_deref() == Some(winner.as_str()) {
            GameOutcome::Won
        } else {
            GameOutcome::Lost {
                winner: winner.clone(),
            }
        };
        tracing::info!(winner = %winner, ?outcome, "Game over");
        self.phase = GamePhase::Over(outcome.clone());

        let mut effects = vec![Effect::Present(Presentation::GameOver(outcome.clone()))];
        if let GameOutcome::Lost { winner } = outcome {
            effects.push(Effect::Present(Presentation::Notice(Notice::Winner(winner))));
        }
        effects.push(Effect::Schedule {
            after: self.timings.leave_after_game_over,
            update: SessionUpdate::LeaveGame,
        });
        effects
    }

    fn feedback(&self, correct: bool) -> Vec<Effect> {
        vec![
            Effect::Present(Presentation::GuessFeedback(correct)),
            Effect::Schedule {
                after: self.timings.feedback_visible,
                update: SessionUpdate::HideFeedback,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_as(username: &str) -> GameSessionState {
        let mut state = GameSessionState::default().with_identity(Some(username.into()), None);
        state.apply_started("p-1".into(), "planet".into());
        state
    }

    fn roster() -> Vec<PlayerScore> {
        vec![PlayerScore::new("bob", 4), PlayerScore::new("alice", 9)]
    }

    #[test]
    fn start_records_player_and_word() {
        let mut state = GameSessionState::default();
        let effects = state.apply_started("p-7".into(), "rocket".into());

        assert_eq!(state.player_id(), Some("p-7"));
        assert_eq!(state.current_word(), Some("rocket"));
        assert_eq!(state.phase(), &GamePhase::Playing);
        assert_eq!(
            effects,
            vec![
                Effect::Persist {
                    key: storage_keys::PLAYER_ID,
                    value: "p-7".into()
                },
                Effect::Present(Presentation::Word("rocket".into())),
            ]
        );
    }

    #[test]
    fn game_over_for_local_user_is_a_win() {
        let mut state = playing_as("alice");
        let effects = state.apply_game_over("alice".into());

        assert_eq!(state.phase(), &GamePhase::Over(GameOutcome::Won));
        assert_eq!(
            effects,
            vec![
                Effect::Present(Presentation::GameOver(GameOutcome::Won)),
                Effect::Schedule {
                    after: LEAVE_AFTER_GAME_OVER,
                    update: SessionUpdate::LeaveGame,
                },
            ]
        );
    }

    #[test]
    fn game_over_for_someone_else_is_a_loss() {
        let mut state = playing_as("alice");
        let effects = state.apply_game_over("bob".into());

        let lost = GameOutcome::Lost {
            winner: "bob".into(),
        };
        assert_eq!(state.phase(), &GamePhase::Over(lost.clone()));
        assert_eq!(effects[0], Effect::Present(Presentation::GameOver(lost)));
        assert!(effects.contains(&Effect::Present(Presentation::Notice(Notice::Winner(
            "bob".into()
        )))));
        assert!(effects.contains(&Effect::Schedule {
            after: LEAVE_AFTER_GAME_OVER,
            update: SessionUpdate::LeaveGame,
        }));
    }

    #[test]
    fn winner_match_is_case_sensitive() {
        let mut state = playing_as("alice");
        state.apply_game_over("Alice".into());

        assert_eq!(
            state.phase(),
            &GamePhase::Over(GameOutcome::Lost {
                winner: "Alice".into()
            })
        );
    }

    #[test]
    fn game_over_is_one_shot_and_blocks_guess_results() {
        let mut state = playing_as("alice");
        state.apply_game_over("bob".into());

        assert!(state.apply_game_over("alice".into()).is_empty());
        assert!(state.apply_correct_guess(Some("moon".into())).is_empty());
        assert!(state.apply_incorrect_guess().is_empty());
        assert_eq!(state.current_word(), Some("planet"));
        assert_eq!(
            state.phase(),
            &GamePhase::Over(GameOutcome::Lost {
                winner: "bob".into()
            })
        );
    }

    #[test]
    fn correct_guess_replaces_word_and_schedules_hide() {
        let mut state = playing_as("alice");
        let effects = state.apply_correct_guess(Some("comet".into()));

        assert_eq!(state.current_word(), Some("comet"));
        assert_eq!(
            effects,
            vec![
                Effect::Present(Presentation::Word("comet".into())),
                Effect::Present(Presentation::GuessFeedback(true)),
                Effect::Schedule {
                    after: FEEDBACK_VISIBLE,
                    update: SessionUpdate::HideFeedback,
                },
            ]
        );
    }

    #[test]
    fn correct_guess_without_word_keeps_current() {
        let mut state = playing_as("alice");
        state.apply_correct_guess(Some(String::new()));
        state.apply_correct_guess(None);

        assert_eq!(state.current_word(), Some("planet"));
    }

    #[test]
    fn incorrect_guess_is_feedback_only() {
        let mut state = playing_as("alice");
        let before = state.clone();
        let effects = state.apply_incorrect_guess();

        assert_eq!(state, before);
        assert_eq!(effects[0], Effect::Present(Presentation::GuessFeedback(false)));
    }

    #[test]
    fn roster_replace_is_idempotent() {
        let mut state = playing_as("alice");
        let first = state.apply_roster_update(roster());
        let after_first = state.clone();
        let second = state.apply_roster_update(roster());

        assert_eq!(state, after_first);
        assert_eq!(first, second);
        assert_eq!(state.roster(), roster().as_slice());
    }

    #[test]
    fn roster_update_is_cached_but_replay_is_not() {
        let mut state = GameSessionState::default();

        let update = state.apply(SessionUpdate::Roster(roster()));
        assert!(update.iter().any(|e| matches!(
            e,
            Effect::Persist { key, .. } if *key == storage_keys::PLAYER_LIST
        )));

        let replay = state.apply(SessionUpdate::RosterReplayed(vec![]));
        assert_eq!(replay, vec![Effect::Present(Presentation::Roster(vec![]))]);
        assert!(state.roster().is_empty());
    }

    #[test]
    fn connection_status_mirrors_channel_reports() {
        let mut state = GameSessionState::default();
        assert_eq!(state.connection_status(), ConnectionState::Disconnected);

        state.apply(SessionUpdate::ConnectionChanged(ConnectionState::Reconnecting));

        assert_eq!(state.connection_status(), ConnectionState::Reconnecting);
    }

    #[test]
    fn leave_only_fires_after_game_over() {
        let mut state = playing_as("alice");
        assert!(state.apply(SessionUpdate::LeaveGame).is_empty());

        state.apply_game_over("alice".into());

        assert_eq!(
            state.apply(SessionUpdate::LeaveGame),
            vec![Effect::Present(Presentation::LeaveGame)]
        );
    }
}
