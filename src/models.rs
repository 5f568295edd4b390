use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    pub fn other(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }
}

/// Full snapshot of the countdown. Only the state machine in `timer`
/// mutates this; everyone else receives clones over the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub running: bool,
    pub mode: TimerMode,
    pub work_duration: u32,
    pub break_duration: u32,
    /// Total length of the cycle currently counting down, in seconds.
    /// Always equals the current mode's configured duration.
    pub cycle_duration: u32,
    /// Whether a pomodoro session is underway (survives pauses; cleared
    /// only by an explicit stop).
    pub active: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        let work = DEFAULT_WORK_MINUTES * 60;
        Self {
            remaining_seconds: work,
            running: false,
            mode: TimerMode::Work,
            work_duration: work,
            break_duration: DEFAULT_BREAK_MINUTES * 60,
            cycle_duration: work,
            active: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub pomodoros_completed: u32,
}

/// Field-wise patch for `TaskStore::update`. `None` leaves the field
/// alone; `due_date` uses a nested Option so it can also be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub priority: Option<bool>,
    #[serde(default)]
    pub due_date: Option<Option<String>>,
}

/// Work/break durations as the user enters them, in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl Settings {
    /// Replaces out-of-range values with the defaults. Anything under one
    /// minute is invalid.
    pub fn sanitized(self) -> Self {
        Self {
            work_minutes: if self.work_minutes == 0 {
                DEFAULT_WORK_MINUTES
            } else {
                self.work_minutes
            },
            break_minutes: if self.break_minutes == 0 {
                DEFAULT_BREAK_MINUTES
            } else {
                self.break_minutes
            },
        }
    }

    pub fn work_seconds(&self) -> u32 {
        self.work_minutes * 60
    }

    pub fn break_seconds(&self) -> u32 {
        self.break_minutes * 60
    }
}

fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}

fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TasksFile {
    pub schema_version: u32,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimerFile {
    pub schema_version: u32,
    pub timer: TimerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}
