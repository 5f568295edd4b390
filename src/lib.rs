//! Pomodoro work/break timer with a persistent task list.
//!
//! The timer itself lives in a background keeper task that outlives any
//! foreground surface; foregrounds drive it with commands and mirror its
//! full-state broadcasts. Tasks and the timer snapshot persist as JSON
//! in the user data directory.

pub mod events;
pub mod keeper;
pub mod logging;
pub mod models;
pub mod notify;
pub mod storage;
pub mod store;
pub mod timer;
