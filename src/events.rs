use serde::{Deserialize, Serialize};

use crate::models::TimerState;

/// Commands a foreground sends to the timer keeper. Delivery is
/// fire-and-forget; per-sender order is preserved, nothing is acked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Stop,
    ToggleMode,
    UpdateSettings { work_minutes: u32, break_minutes: u32 },
    /// Asks for a fresh broadcast; a (re)attaching foreground sends this
    /// to resynchronize.
    RequestState,
    /// Generic side-channel: show a notification on the keeper's behalf.
    ShowNotification { title: String, body: String },
}

/// Broadcasts from the keeper. Every transition publishes the full
/// state; there are no deltas to reconcile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    StateUpdate(TimerState),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_as_tagged_snake_case() {
        let value = serde_json::to_value(TimerCommand::Start).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "start" }));

        let value = serde_json::to_value(TimerCommand::UpdateSettings {
            work_minutes: 50,
            break_minutes: 10,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "update_settings",
                "work_minutes": 50,
                "break_minutes": 10
            })
        );

        let back: TimerCommand =
            serde_json::from_value(serde_json::json!({ "type": "toggle_mode" })).unwrap();
        assert_eq!(back, TimerCommand::ToggleMode);
    }

    #[test]
    fn show_notification_carries_title_and_body() {
        let command = TimerCommand::ShowNotification {
            title: "Pomodoro".to_string(),
            body: "Work session complete!".to_string(),
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["type"], "show_notification");
        assert_eq!(value["title"], "Pomodoro");
        let back: TimerCommand = serde_json::from_value(value).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn state_update_event_embeds_the_full_snapshot() {
        let event = TimerEvent::StateUpdate(TimerState::default());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "state_update");
        assert_eq!(value["remaining_seconds"], 1500);
        assert_eq!(value["mode"], "work");
    }
}
