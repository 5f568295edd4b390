//! The background timer keeper: one lifecycle-scoped service instance
//! owns the countdown so it survives foreground teardown. Foregrounds
//! talk to it exclusively through `KeeperHandle` — commands in, full
//! state snapshots out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use crate::events::{TimerCommand, TimerEvent};
use crate::models::{Settings, TimerMode, TimerState};
use crate::notify::Notifier;
use crate::storage::Storage;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Foreground half of the relay. Cloneable; every clone feeds the same
/// keeper and sees the same broadcasts.
#[derive(Clone)]
pub struct KeeperHandle {
    commands: mpsc::UnboundedSender<TimerCommand>,
    events: broadcast::Sender<TimerEvent>,
}

impl KeeperHandle {
    /// Fire-and-forget send. A closed keeper means shutdown is underway;
    /// the command is logged and dropped.
    pub fn send(&self, command: TimerCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("timer keeper is gone, command dropped");
        }
    }

    /// Subscribes to full-state broadcasts. New subscribers should send
    /// `TimerCommand::RequestState` to get an immediate snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }
}

/// Restores the persisted snapshot, applies the configured durations,
/// and spawns the keeper loop. The keeper runs until every handle is
/// dropped, persisting a final snapshot on the way out.
pub fn spawn(storage: Storage, notifier: Arc<dyn Notifier>) -> KeeperHandle {
    let settings = storage.settings_or_default();
    let mut state = storage.timer_or_default().restored();
    state.apply_settings(settings.work_seconds(), settings.break_seconds());

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let keeper = Keeper {
        state,
        storage,
        notifier,
        events: events_tx.clone(),
    };
    tokio::spawn(keeper.run(commands_rx));

    KeeperHandle {
        commands: commands_tx,
        events: events_tx,
    }
}

struct Keeper {
    state: TimerState,
    storage: Storage,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<TimerEvent>,
}

impl Keeper {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<TimerCommand>) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => self.on_tick(),
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
            }
        }
        self.persist();
        log::info!("timer keeper stopped");
    }

    fn on_tick(&mut self) {
        if !self.state.running {
            return;
        }
        if let Some(finished) = self.state.tick() {
            self.announce_completion(finished);
        }
        self.persist();
        self.broadcast();
    }

    fn on_command(&mut self, command: TimerCommand) {
        log::debug!("command: {command:?}");
        match command {
            TimerCommand::Start => self.state.start(),
            TimerCommand::Pause => self.state.pause(),
            TimerCommand::Resume => self.state.resume(),
            TimerCommand::Stop => self.state.stop(),
            TimerCommand::ToggleMode => self.state.toggle_mode(),
            TimerCommand::UpdateSettings {
                work_minutes,
                break_minutes,
            } => {
                let settings = Settings {
                    work_minutes,
                    break_minutes,
                }
                .sanitized();
                self.state
                    .apply_settings(settings.work_seconds(), settings.break_seconds());
                if let Err(error) = self.storage.save_settings(&settings) {
                    log::warn!("failed to persist settings: {error}");
                }
            }
            TimerCommand::RequestState => {
                // Resync only; nothing changed, nothing to persist.
                self.broadcast();
                return;
            }
            TimerCommand::ShowNotification { title, body } => {
                self.notifier.notify(&title, &body);
                return;
            }
        }
        self.persist();
        self.broadcast();
    }

    fn announce_completion(&self, finished: TimerMode) {
        let body = match finished {
            TimerMode::Work => format!(
                "Work session complete! Time for a {}-minute break.",
                self.state.break_duration / 60
            ),
            TimerMode::Break => format!(
                "Break is over! Ready for a {}-minute work session.",
                self.state.work_duration / 60
            ),
        };
        log::info!("{} cycle finished", finished.as_str());
        self.notifier.notify("Pomodoro", &body);
        self.notifier.play_sound();
    }

    fn persist(&self) {
        if let Err(error) = self.storage.save_timer(&self.state) {
            log::warn!("failed to persist timer snapshot: {error}");
        }
    }

    /// Fire-and-forget broadcast. With no subscribers the send fails;
    /// that is the normal detached-foreground case.
    fn broadcast(&self) {
        let _ = self
            .events
            .send(TimerEvent::StateUpdate(self.state.clone()));
    }
}
