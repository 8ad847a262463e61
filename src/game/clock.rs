//! Session scheduler: serializes intents, clock ticks, monster steps and cosmetic clears
//! onto one [`GameState`] along a logical timeline.
//!
//! Time is a `Duration` since the session started, supplied by the caller. Timers are armed
//! and disarmed only by [`Session::reconcile`], which runs after every applied command, so
//! the row clock never runs against a paused game or a monster run.

use super::achievements::{Achievement, Achievements};
use super::powerups::MONSTER_STEP_INTERVAL;
use super::{Command, Cosmetic, Followup, GameState, Intent, SoundEvent, Status};
use crate::dictionary::Dictionary;
use log::{debug, trace};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Clock,
    Monster,
    Clear(Cosmetic),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    due: Duration,
    command: Command,
}

#[derive(Debug)]
pub struct Session {
    state: GameState,
    queue: VecDeque<Command>,
    timers: Vec<Timer>,
    /// Interval the armed clock timer was scheduled with.
    clock_interval: Option<Duration>,
    now: Duration,
    sounds: Vec<SoundEvent>,
    achievements: Achievements,
    unlocked: Vec<Achievement>,
    pending_dictionary: Option<Rc<dyn Dictionary>>,
}

impl Session {
    pub fn new(mut state: GameState) -> Self {
        state.refresh_gates();
        let mut session = Self {
            state,
            queue: VecDeque::new(),
            timers: Vec::new(),
            clock_interval: None,
            now: Duration::ZERO,
            sounds: Vec::new(),
            achievements: Achievements::default(),
            unlocked: Vec::new(),
            pending_dictionary: None,
        };
        session.reconcile();
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Queue an intent. It is applied, in order, by the next [`Self::advance`].
    pub fn submit(&mut self, intent: Intent) {
        self.queue.push_back(Command::Intent(intent));
    }

    /// New word list for the next reset or language switch.
    pub fn replace_dictionary(&mut self, dictionary: Rc<dyn Dictionary>) {
        self.pending_dictionary = Some(dictionary);
    }

    /// Apply queued intents, then every timer due up to `now` in deadline order.
    /// Intents see `now`, or the earliest pending deadline if that comes first; each
    /// timer's command sees its own due time as the current time.
    pub fn advance(&mut self, now: Duration) {
        let horizon = self.next_deadline().map_or(now, |due| due.min(now));
        self.now = self.now.max(horizon);
        self.drain_queue();
        while let Some(index) = self.next_due(now) {
            let timer = self.timers.swap_remove(index);
            self.now = self.now.max(timer.due);
            trace!("{:?} fired at {:?}", timer.kind, timer.due);
            self.run(timer.command);
            self.drain_queue();
        }
        self.now = self.now.max(now);
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn drain_unlocked(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.unlocked)
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    fn next_due(&self, now: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| t.due)
            .map(|(i, _)| i)
    }

    fn drain_queue(&mut self) {
        while let Some(command) = self.queue.pop_front() {
            self.run(command);
        }
    }

    fn run(&mut self, command: Command) {
        if let Command::Intent(intent) = command {
            debug!("intent {intent:?} at {:?}", self.now);
            if matches!(intent, Intent::Reset | Intent::SwitchLanguage) {
                if let Some(dictionary) = self.pending_dictionary.take() {
                    self.state.set_dictionary(dictionary);
                }
            }
        }
        let epoch = self.state.epoch;
        let followups = self.state.apply(command, self.now);
        if self.state.epoch != epoch {
            self.timers.clear();
            self.clock_interval = None;
        }
        for followup in followups {
            match followup {
                Followup::Sound(sound) => self.sounds.push(sound),
                Followup::Event(event) => self.achievements.record(event),
                Followup::ClearAfter(delay, what) => {
                    let command = Command::Clear {
                        what,
                        epoch: self.state.epoch,
                    };
                    self.arm(TimerKind::Clear(what), self.now + delay, command);
                }
            }
        }
        let unlocked = self.achievements.check(&self.state);
        for achievement in &unlocked {
            debug!("achievement unlocked: {}", achievement.title());
        }
        self.unlocked.extend(unlocked);
        self.reconcile();
    }

    /// Arm or disarm the clock and monster timers to match the state.
    fn reconcile(&mut self) {
        let playing = self.state.status == Status::Playing;
        let monster_active = self.state.monster.active;

        if playing && !monster_active {
            let interval = self.state.tick_interval;
            if self.clock_interval != Some(interval) || !self.is_armed(TimerKind::Clock) {
                self.arm(TimerKind::Clock, self.now + interval, Command::Tick);
                self.clock_interval = Some(interval);
            }
        } else {
            self.disarm(TimerKind::Clock);
            self.clock_interval = None;
        }

        if playing && monster_active {
            if !self.is_armed(TimerKind::Monster) {
                self.arm(
                    TimerKind::Monster,
                    self.now + MONSTER_STEP_INTERVAL,
                    Command::MonsterStep,
                );
            }
        } else {
            self.disarm(TimerKind::Monster);
        }
    }

    fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Schedule `command`, replacing any pending timer of the same kind.
    fn arm(&mut self, kind: TimerKind, due: Duration, command: Command) {
        self.disarm(kind);
        self.timers.push(Timer { kind, due, command });
    }

    fn disarm(&mut self, kind: TimerKind) {
        self.timers.retain(|t| t.kind != kind);
    }
}
