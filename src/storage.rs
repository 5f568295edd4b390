use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Settings, SettingsFile, Task, TasksFile, TimerFile, TimerState};

const TASKS_FILE: &str = "tasks.json";
const TIMER_FILE: &str = "timer.json";
const SETTINGS_FILE: &str = "settings.json";

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// JSON persistence rooted at one data directory: the task list, the
/// timer snapshot, and the duration settings each live in their own file.
/// Writers are not coordinated across processes; last writer wins.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The per-user data directory, next to other app data
    /// (`~/.local/share/pomokeeper` on Linux).
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pomokeeper")
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn load_tasks(&self) -> Result<TasksFile, StorageError> {
        self.load_json(TASKS_FILE)
    }

    pub fn load_timer(&self) -> Result<TimerFile, StorageError> {
        self.load_json(TIMER_FILE)
    }

    pub fn load_settings(&self) -> Result<SettingsFile, StorageError> {
        self.load_json(SETTINGS_FILE)
    }

    /// Missing or malformed data is treated as absent: the caller gets an
    /// empty list and nothing fails.
    pub fn tasks_or_default(&self) -> Vec<Task> {
        match self.load_tasks() {
            Ok(file) => file.tasks,
            Err(error) => {
                log::warn!("tasks unreadable, starting empty: {error}");
                Vec::new()
            }
        }
    }

    pub fn timer_or_default(&self) -> TimerState {
        match self.load_timer() {
            Ok(file) => file.timer,
            Err(error) => {
                log::warn!("timer snapshot unreadable, using defaults: {error}");
                TimerState::default()
            }
        }
    }

    pub fn settings_or_default(&self) -> Settings {
        match self.load_settings() {
            Ok(file) => file.settings.sanitized(),
            Err(error) => {
                log::warn!("settings unreadable, using defaults: {error}");
                Settings::default()
            }
        }
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let file = TasksFile {
            schema_version: SCHEMA_VERSION,
            tasks: tasks.to_vec(),
        };
        self.write_atomic(TASKS_FILE, &file)
    }

    pub fn save_timer(&self, timer: &TimerState) -> Result<(), StorageError> {
        let file = TimerFile {
            schema_version: SCHEMA_VERSION,
            timer: timer.clone(),
        };
        self.write_atomic(TIMER_FILE, &file)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let file = SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: settings.clone(),
        };
        self.write_atomic(SETTINGS_FILE, &file)
    }

    fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<T, StorageError> {
        let mut file = File::open(self.root.join(filename))?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize>(&self, filename: &str, data: &T) -> Result<(), StorageError> {
        let path = self.root.join(filename);
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}
