//! Game session state machine
//!
//! The session owns the controller registry and the current phase. The
//! manager feeds it connection changes between ticks and one batch of
//! readings per tick; the session answers with the feedback to push to every
//! controller and any disconnections players asked for.
//!
//! Phases run Lobby → Countdown → Active → Ending → Lobby. Countdown and
//! Ending carry their sequence player, so they are sampled tick by tick
//! instead of blocking the loop; input read during them is ignored.

use crate::controller::{Button, ControllerId, ControllerReading, Feedback, Rgb, Transport};
use crate::game::colors;
use crate::game::elimination::{self, Verdict};
use crate::game::registry::{ControllerRegistry, ControllerState};
use crate::game::sequence::{self, SequencePlayer};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Trigger pressure that joins the game
pub const JOIN_TRIGGER_THRESHOLD: f32 = 0.5;

/// Players needed before a game can start
pub const MIN_PLAYERS: usize = 2;

/// Lobby light for a connected controller that hasn't joined
pub const LOBBY_IDLE_COLOR: Rgb = Rgb::new(0.2, 0.1, 0.0);

/// Lobby light for a controller that has joined
pub const LOBBY_JOINED_COLOR: Rgb = Rgb::WHITE;

/// Light shown on controllers plugged in for pairing
pub const WIRED_COLOR: Rgb = Rgb::WHITE;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Countdown,
    Active,
    Ending,
}

/// Winner animation in progress
#[derive(Debug, Clone)]
struct Celebration {
    winner: ControllerId,
    player: SequencePlayer,
}

/// Phase plus the data only that phase needs
#[derive(Debug, Clone)]
enum Stage {
    Lobby,
    Countdown(SequencePlayer),
    Active,
    /// `None` when nobody survived
    Ending(Option<Celebration>),
}

impl Stage {
    fn phase(&self) -> Phase {
        match self {
            Stage::Lobby => Phase::Lobby,
            Stage::Countdown(_) => Phase::Countdown,
            Stage::Active => Phase::Active,
            Stage::Ending(_) => Phase::Ending,
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Feedback for every controller read this tick, sorted by id
    pub writes: Vec<(ControllerId, Feedback)>,

    /// Controllers whose players asked to disconnect
    pub disconnect_requests: Vec<ControllerId>,

    /// Phase change made during this tick
    pub transition: Option<(Phase, Phase)>,
}

impl TickOutcome {
    /// Feedback written to `id` this tick
    pub fn feedback_for(&self, id: &ControllerId) -> Option<Feedback> {
        self.writes.iter().find(|(w, _)| w == id).map(|(_, f)| *f)
    }
}

/// A long-lived game session
#[derive(Debug)]
pub struct Session {
    registry: ControllerRegistry,
    stage: Stage,
    start_requested: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            registry: ControllerRegistry::new(),
            stage: Stage::Lobby,
            start_requested: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.stage.phase()
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Alive controllers in join order
    pub fn alive(&self) -> &[ControllerId] {
        self.registry.alive()
    }

    pub fn start_requested(&self) -> bool {
        self.start_requested
    }

    /// Register a connected controller.
    ///
    /// Returns `true` the first time this id is seen over this transport.
    pub fn on_connect(&mut self, id: ControllerId, transport: Transport) -> bool {
        let first_contact = self.registry.connect(id.clone(), transport);

        match (transport, first_contact) {
            (Transport::Wireless, true) => info!("{} paired over bluetooth", id),
            (Transport::Wireless, false) => info!("{} reconnected over bluetooth", id),
            (Transport::Wired, _) => info!("{} connected over USB", id),
        }

        first_contact
    }

    /// Forget a controller; unknown ids are ignored
    pub fn on_disconnect(&mut self, id: &ControllerId) {
        let was_alive = self.registry.is_alive(id);
        if self.registry.disconnect(id).is_some() {
            info!("{} disconnected", id);
            if was_alive && self.phase() != Phase::Lobby {
                info!("{} left mid-game, {} still in", id, self.registry.alive_count());
            }
        }
    }

    /// Put a controller in the next game. Only possible in the lobby.
    pub fn join_game(&mut self, id: &ControllerId) -> bool {
        if self.phase() != Phase::Lobby {
            debug!("Ignoring join from {} outside the lobby", id);
            return false;
        }

        let joined = self.registry.admit(id);
        if joined {
            info!("{} joined the game", id);
        }
        joined
    }

    /// Run one tick with this tick's readings.
    ///
    /// Controllers missing from `readings` are neither evaluated nor written.
    pub fn tick(
        &mut self,
        now: Instant,
        readings: &HashMap<ControllerId, ControllerReading>,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let before = self.phase();

        let mut ids: Vec<&ControllerId> = readings
            .keys()
            .filter(|id| self.registry.contains(id))
            .collect();
        ids.sort();

        // Wired controllers only ever show that they're plugged in
        for id in &ids {
            if let Some(record) = self.registry.get_mut(id) {
                if !record.is_wireless() {
                    record.state.feedback = Feedback::new(WIRED_COLOR, 0);
                }
            }
        }

        let next = match before {
            Phase::Lobby => self.lobby_tick(&ids, readings, &mut outcome),
            Phase::Countdown => self.countdown_tick(now),
            Phase::Active => self.active_tick(&ids, readings),
            Phase::Ending => self.ending_tick(now),
        };

        if let Some(stage) = next {
            self.stage = stage;
        }

        let after = self.phase();
        if before != after {
            info!("Phase: {:?} -> {:?}", before, after);
            outcome.transition = Some((before, after));
        }

        outcome.writes = ids
            .into_iter()
            .filter_map(|id| {
                self.registry
                    .get(id)
                    .map(|record| (id.clone(), record.state.feedback))
            })
            .collect();

        outcome
    }

    fn lobby_tick(
        &mut self,
        ids: &[&ControllerId],
        readings: &HashMap<ControllerId, ControllerReading>,
        outcome: &mut TickOutcome,
    ) -> Option<Stage> {
        for &id in ids {
            let wireless = self.registry.get(id).map_or(false, |r| r.is_wireless());
            let Some(reading) = readings.get(id) else {
                continue;
            };
            if !wireless {
                continue;
            }

            if !self.registry.is_alive(id) && reading.trigger > JOIN_TRIGGER_THRESHOLD {
                self.join_game(id);
            }

            if reading.buttons.is_pressed(Button::Start) && !self.start_requested {
                info!("{} pressed START", id);
                self.start_requested = true;
            }

            let alive = self.registry.is_alive(id);
            let Some(record) = self.registry.get_mut(id) else {
                continue;
            };

            let mut color = if alive { LOBBY_JOINED_COLOR } else { LOBBY_IDLE_COLOR };

            if reading.buttons.is_pressed(Button::Circle) {
                if !record.state.battery_display {
                    debug!("{} showing battery level {}", id, reading.battery);
                    record.state.battery_display = true;
                }
                color = battery_color(reading.battery);
            } else if record.state.battery_display {
                record.state.battery_display = false;
            }

            record.state.feedback = Feedback::new(color, 0);

            if reading.buttons.is_pressed(Button::Select)
                || reading.buttons.is_pressed(Button::Ps)
            {
                info!("{} asked to disconnect", id);
                outcome.disconnect_requests.push(id.clone());
            }
        }

        if self.should_start() {
            let countdown = sequence::countdown();
            info!(
                "Game starting with {} players ({:?} countdown)",
                self.registry.alive_count(),
                countdown.total_duration()
            );
            self.start_requested = false;
            return Some(Stage::Countdown(countdown));
        }

        None
    }

    /// Everyone connected has joined, or someone pressed START
    fn should_start(&self) -> bool {
        let alive = self.registry.alive_count();
        alive >= MIN_PLAYERS && (alive == self.registry.wireless_count() || self.start_requested)
    }

    fn countdown_tick(&mut self, now: Instant) -> Option<Stage> {
        let frame = match &mut self.stage {
            Stage::Countdown(player) => player.sample(now),
            _ => return None,
        };

        match frame {
            Some(feedback) => {
                self.show_alive(|_| Some(feedback));
                None
            }
            None => {
                self.assign_colors();
                info!("Game start!");
                Some(Stage::Active)
            }
        }
    }

    /// Hand out player colors and show them
    fn assign_colors(&mut self) {
        let palette = colors::generate(self.registry.alive_count());
        self.registry.assign_colors(&palette);
        self.show_alive(|state| state.assigned_color.map(|c| Feedback::new(c, 0)));
    }

    fn show_alive(&mut self, feedback: impl Fn(&ControllerState) -> Option<Feedback>) {
        let alive = self.registry.alive().to_vec();
        for id in alive {
            if let Some(record) = self.registry.get_mut(&id) {
                if let Some(f) = feedback(&record.state) {
                    record.state.feedback = f;
                }
            }
        }
    }

    fn active_tick(
        &mut self,
        ids: &[&ControllerId],
        readings: &HashMap<ControllerId, ControllerReading>,
    ) -> Option<Stage> {
        for &id in ids {
            let alive = self.registry.is_alive(id);
            let Some(reading) = readings.get(id) else {
                continue;
            };
            let Some(record) = self.registry.get_mut(id) else {
                continue;
            };
            if !record.is_wireless() {
                continue;
            }

            if !alive {
                record.state.feedback.color = Rgb::OFF;
                continue;
            }

            let magnitude = elimination::magnitude(&reading.accelerometer);
            let Some(verdict) = elimination::track(&mut record.state.last_motion, magnitude) else {
                continue;
            };

            let Some(assigned) = record.state.assigned_color else {
                warn!("{} is alive without a color", id);
                continue;
            };

            record.state.feedback =
                elimination::directive(verdict, assigned, record.state.feedback);

            match verdict {
                Verdict::Eliminate => {
                    self.registry.eliminate(id);
                    info!("DEAD {} ({} left)", id, self.registry.alive_count());
                }
                Verdict::Warn => debug!("{} is moving", id),
                Verdict::Safe => {}
            }
        }

        if self.registry.alive_count() <= 1 {
            return Some(self.finish_game());
        }

        None
    }

    fn finish_game(&mut self) -> Stage {
        match self.registry.alive() {
            [winner] => {
                info!("WIN {}", winner);
                Stage::Ending(Some(Celebration {
                    winner: winner.clone(),
                    player: sequence::celebration(),
                }))
            }
            _ => {
                info!("Nobody survived");
                Stage::Ending(None)
            }
        }
    }

    fn ending_tick(&mut self, now: Instant) -> Option<Stage> {
        let frame = match &mut self.stage {
            Stage::Ending(Some(celebration)) => celebration
                .player
                .sample(now)
                .map(|feedback| (celebration.winner.clone(), feedback)),
            Stage::Ending(None) => None,
            _ => return None,
        };

        match frame {
            Some((winner, feedback)) => {
                // The winner may have disconnected mid-celebration
                if let Some(record) = self.registry.get_mut(&winner) {
                    record.state.feedback = feedback;
                }
                None
            }
            None => {
                self.registry.reset_game();
                self.start_requested = false;
                Some(Stage::Lobby)
            }
        }
    }
}

/// Lobby light while CIRCLE is held
pub fn battery_color(level: u8) -> Rgb {
    match level {
        5 => Rgb::GREEN,
        4 => Rgb::new(0.5, 0.78, 0.0),
        3 => Rgb::YELLOW,
        _ => Rgb::RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Accelerometer, Buttons, MAX_RUMBLE};
    use std::time::Duration;

    fn id(s: &str) -> ControllerId {
        ControllerId::from(s)
    }

    fn still() -> ControllerReading {
        ControllerReading {
            trigger: 0.0,
            buttons: Buttons::default(),
            battery: 5,
            accelerometer: Accelerometer::new(0.0, 0.0, 1.0),
        }
    }

    fn pulled() -> ControllerReading {
        ControllerReading { trigger: 1.0, ..still() }
    }

    fn pressing(button: Button) -> ControllerReading {
        ControllerReading { buttons: Buttons::default().with(button), ..still() }
    }

    fn shaken(z: f64) -> ControllerReading {
        ControllerReading { accelerometer: Accelerometer::new(0.0, 0.0, z), ..still() }
    }

    fn readings(entries: &[(&str, ControllerReading)]) -> HashMap<ControllerId, ControllerReading> {
        entries.iter().map(|(name, r)| (id(name), *r)).collect()
    }

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::new();
        for name in names {
            session.on_connect(id(name), Transport::Wireless);
        }
        session
    }

    /// Join `players` in the lobby and run the countdown to the Active phase
    fn start_game(names: &[&str], t0: Instant) -> Session {
        let mut session = session_with(names);
        let joins: Vec<_> = names.iter().map(|n| (*n, pulled())).collect();
        session.tick(t0, &readings(&joins));
        assert_eq!(session.phase(), Phase::Countdown);

        let idle: Vec<_> = names.iter().map(|n| (*n, still())).collect();
        session.tick(t0 + Duration::from_millis(10), &readings(&idle));
        session.tick(t0 + Duration::from_secs(4), &readings(&idle));
        assert_eq!(session.phase(), Phase::Active);
        session
    }

    #[test]
    fn test_all_joined_starts_without_start_button() {
        let mut session = session_with(&["a", "b", "c"]);
        let outcome = session.tick(
            Instant::now(),
            &readings(&[("a", pulled()), ("b", pulled()), ("c", pulled())]),
        );

        assert_eq!(outcome.transition, Some((Phase::Lobby, Phase::Countdown)));
        assert_eq!(session.alive().len(), 3);
    }

    #[test]
    fn test_two_of_three_with_start_starts() {
        let mut session = session_with(&["a", "b", "c"]);
        let t0 = Instant::now();
        session.tick(t0, &readings(&[("a", pulled()), ("b", pulled()), ("c", still())]));
        assert_eq!(session.phase(), Phase::Lobby);

        session.tick(
            t0 + Duration::from_millis(10),
            &readings(&[("a", pressing(Button::Start)), ("b", still()), ("c", still())]),
        );
        assert_eq!(session.phase(), Phase::Countdown);
        assert!(!session.start_requested());
    }

    #[test]
    fn test_one_player_with_start_does_not_start() {
        let mut session = session_with(&["a", "b", "c"]);
        let t0 = Instant::now();
        session.tick(t0, &readings(&[("a", pulled()), ("b", still()), ("c", still())]));
        session.tick(
            t0 + Duration::from_millis(10),
            &readings(&[("a", pressing(Button::Start)), ("b", still()), ("c", still())]),
        );

        assert_eq!(session.phase(), Phase::Lobby);
        assert!(session.start_requested());
    }

    #[test]
    fn test_lobby_lights() {
        let mut session = session_with(&["a", "b"]);
        session.on_connect(id("usb"), Transport::Wired);
        let outcome = session.tick(
            Instant::now(),
            &readings(&[("a", pulled()), ("b", still()), ("usb", pulled())]),
        );

        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(LOBBY_JOINED_COLOR, 0)));
        assert_eq!(outcome.feedback_for(&id("b")), Some(Feedback::new(LOBBY_IDLE_COLOR, 0)));
        assert_eq!(outcome.feedback_for(&id("usb")), Some(Feedback::new(WIRED_COLOR, 0)));
        // Wired controllers never join
        assert_eq!(session.alive(), &[id("a")]);
    }

    #[test]
    fn test_battery_display_while_circle_held() {
        let mut session = session_with(&["a", "b"]);
        let t0 = Instant::now();
        let low_battery = ControllerReading { battery: 1, ..pressing(Button::Circle) };

        let outcome = session.tick(t0, &readings(&[("a", low_battery), ("b", still())]));
        assert_eq!(outcome.feedback_for(&id("a")).unwrap().color, Rgb::RED);
        assert!(session.registry().get(&id("a")).unwrap().state.battery_display);

        let outcome = session.tick(
            t0 + Duration::from_millis(10),
            &readings(&[("a", still()), ("b", still())]),
        );
        assert_eq!(outcome.feedback_for(&id("a")).unwrap().color, LOBBY_IDLE_COLOR);
        assert!(!session.registry().get(&id("a")).unwrap().state.battery_display);
    }

    #[test]
    fn test_battery_tiers() {
        assert_eq!(battery_color(5), Rgb::GREEN);
        assert_eq!(battery_color(4), Rgb::new(0.5, 0.78, 0.0));
        assert_eq!(battery_color(3), Rgb::YELLOW);
        assert_eq!(battery_color(2), Rgb::RED);
        assert_eq!(battery_color(0xEE), Rgb::RED);
    }

    #[test]
    fn test_select_or_ps_requests_disconnect() {
        let mut session = session_with(&["a", "b", "c"]);
        let outcome = session.tick(
            Instant::now(),
            &readings(&[
                ("a", pressing(Button::Select)),
                ("b", pressing(Button::Ps)),
                ("c", still()),
            ]),
        );
        assert_eq!(outcome.disconnect_requests, vec![id("a"), id("b")]);
    }

    #[test]
    fn test_join_only_in_lobby() {
        let mut session = start_game(&["a", "b"], Instant::now());
        session.on_connect(id("late"), Transport::Wireless);
        assert!(!session.join_game(&id("late")));
        assert_eq!(session.alive().len(), 2);
    }

    #[test]
    fn test_countdown_ignores_input_and_assigns_colors() {
        let mut session = session_with(&["a", "b"]);
        let t0 = Instant::now();
        session.tick(t0, &readings(&[("a", pulled()), ("b", pulled())]));

        // Start/disconnect buttons are dropped during the countdown
        let outcome = session.tick(
            t0 + Duration::from_millis(10),
            &readings(&[("a", pressing(Button::Select)), ("b", shaken(3.0))]),
        );
        assert!(outcome.disconnect_requests.is_empty());
        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(Rgb::WHITE, 0)));

        let outcome = session.tick(
            t0 + Duration::from_millis(600),
            &readings(&[("a", still()), ("b", still())]),
        );
        assert_eq!(outcome.feedback_for(&id("b")), Some(Feedback::new(Rgb::WHITE, MAX_RUMBLE)));
        assert_eq!(session.phase(), Phase::Countdown);

        let outcome = session.tick(
            t0 + Duration::from_secs(4),
            &readings(&[("a", still()), ("b", still())]),
        );
        assert_eq!(outcome.transition, Some((Phase::Countdown, Phase::Active)));

        let a = session.registry().get(&id("a")).unwrap().state.assigned_color;
        let b = session.registry().get(&id("b")).unwrap().state.assigned_color;
        assert_eq!(a, Some(Rgb::RED));
        assert_eq!(b, Some(Rgb::new(0.0, 1.0, 1.0)));
        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(Rgb::RED, 0)));
    }

    #[test]
    fn test_colors_only_for_alive_players() {
        let mut session = session_with(&["a", "b", "watcher"]);
        let t0 = Instant::now();
        session.tick(t0, &readings(&[("a", pulled()), ("b", pulled()), ("watcher", still())]));
        session.tick(
            t0 + Duration::from_millis(10),
            &readings(&[("a", pressing(Button::Start)), ("b", still()), ("watcher", still())]),
        );
        session.tick(t0 + Duration::from_millis(20), &readings(&[("a", still())]));
        session.tick(t0 + Duration::from_secs(4), &readings(&[("a", still())]));
        assert_eq!(session.phase(), Phase::Active);

        assert!(session.registry().get(&id("watcher")).unwrap().state.assigned_color.is_none());

        // Spectators go dark during the game
        let outcome = session.tick(t0 + Duration::from_secs(5), &readings(&[("watcher", still())]));
        assert_eq!(outcome.feedback_for(&id("watcher")).unwrap().color, Rgb::OFF);
    }

    #[test]
    fn test_elimination_warn_and_reset() {
        let t0 = Instant::now();
        let mut session = start_game(&["a", "b", "c"], t0);
        let t = |ms: u64| t0 + Duration::from_secs(5) + Duration::from_millis(ms);

        // First samples only record
        session.tick(t(0), &readings(&[("a", still()), ("b", still()), ("c", still())]));

        let outcome = session.tick(
            t(10),
            &readings(&[("a", shaken(1.3)), ("b", shaken(1.15)), ("c", shaken(1.71))]),
        );
        let a_color = session.registry().get(&id("a")).unwrap().state.assigned_color.unwrap();
        let b_color = session.registry().get(&id("b")).unwrap().state.assigned_color.unwrap();

        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(a_color.scale(0.3), 0)));
        assert_eq!(outcome.feedback_for(&id("b")), Some(Feedback::new(b_color, 0)));
        assert_eq!(outcome.feedback_for(&id("c")), Some(Feedback::new(Rgb::OFF, MAX_RUMBLE)));
        assert_eq!(session.alive(), &[id("a"), id("b")]);
        assert_eq!(session.registry().get(&id("c")).unwrap().state.last_motion, None);
        assert_eq!(session.phase(), Phase::Active);

        // Holding still again restores the full color
        let outcome = session.tick(
            t(20),
            &readings(&[("a", shaken(1.3)), ("b", shaken(1.15)), ("c", still())]),
        );
        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(a_color, 0)));
        // Eliminated controllers stay dark and are not evaluated
        assert_eq!(outcome.feedback_for(&id("c")).unwrap().color, Rgb::OFF);
        assert_eq!(session.registry().get(&id("c")).unwrap().state.last_motion, None);
    }

    #[test]
    fn test_last_player_wins_and_lobby_resets() {
        let t0 = Instant::now();
        let mut session = start_game(&["a", "b"], t0);
        let t = |ms: u64| t0 + Duration::from_secs(5) + Duration::from_millis(ms);

        session.tick(t(0), &readings(&[("a", still()), ("b", still())]));
        let outcome = session.tick(t(10), &readings(&[("a", shaken(2.0)), ("b", still())]));
        assert_eq!(outcome.transition, Some((Phase::Active, Phase::Ending)));

        let outcome = session.tick(t(20), &readings(&[("a", still()), ("b", still())]));
        assert_eq!(outcome.feedback_for(&id("b")).unwrap().rumble, MAX_RUMBLE);
        assert_eq!(session.phase(), Phase::Ending);

        let outcome = session.tick(
            t(20) + Duration::from_secs(3),
            &readings(&[("a", still()), ("b", still())]),
        );
        assert_eq!(outcome.transition, Some((Phase::Ending, Phase::Lobby)));
        assert!(session.alive().is_empty());
        assert!(session.registry().get(&id("b")).unwrap().state.assigned_color.is_none());
        // Lobby lights come back on the next tick
        let outcome = session.tick(
            t(20) + Duration::from_secs(4),
            &readings(&[("a", still()), ("b", still())]),
        );
        assert_eq!(outcome.feedback_for(&id("a")), Some(Feedback::new(LOBBY_IDLE_COLOR, 0)));
    }

    #[test]
    fn test_simultaneous_elimination_has_no_celebration() {
        let t0 = Instant::now();
        let mut session = start_game(&["a", "b"], t0);
        let t = |ms: u64| t0 + Duration::from_secs(5) + Duration::from_millis(ms);

        session.tick(t(0), &readings(&[("a", still()), ("b", still())]));
        session.tick(t(10), &readings(&[("a", shaken(2.0)), ("b", shaken(2.0))]));
        assert_eq!(session.phase(), Phase::Ending);

        let outcome = session.tick(t(20), &readings(&[("a", still()), ("b", still())]));
        assert_eq!(outcome.transition, Some((Phase::Ending, Phase::Lobby)));
    }

    #[test]
    fn test_disconnect_mid_game_purges_and_ends() {
        let t0 = Instant::now();
        let mut session = start_game(&["a", "b"], t0);
        session.tick(t0 + Duration::from_secs(5), &readings(&[("a", still()), ("b", still())]));

        session.on_disconnect(&id("a"));
        assert_eq!(session.alive(), &[id("b")]);
        assert!(session.registry().get(&id("a")).is_none());

        let outcome = session.tick(t0 + Duration::from_secs(6), &readings(&[("b", still())]));
        assert_eq!(outcome.transition, Some((Phase::Active, Phase::Ending)));

        // Idempotent
        session.on_disconnect(&id("a"));
        session.on_disconnect(&id("a"));
    }

    #[test]
    fn test_readings_for_unknown_ids_are_ignored() {
        let mut session = session_with(&["a"]);
        let outcome = session.tick(Instant::now(), &readings(&[("ghost", pulled())]));
        assert!(outcome.writes.is_empty());
        assert!(session.alive().is_empty());
    }
}
