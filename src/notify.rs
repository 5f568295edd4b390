//! Environment services for completion cues. The keeper only sees the
//! trait, so tests substitute a recording double and non-desktop targets
//! can plug in their own surface.

use notify_rust::Notification;

pub trait Notifier: Send + Sync + 'static {
    /// Best-effort desktop notification. Failures must not propagate.
    fn notify(&self, title: &str, body: &str);

    /// Best-effort audible cue.
    fn play_sound(&self);
}

/// Production notifier backed by the desktop notification daemon. The
/// audible cue rides on the notification sound hint rather than a
/// separate audio stack.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        if let Err(error) = Notification::new().summary(title).body(body).show() {
            log::warn!("notification failed: {error}");
        }
    }

    fn play_sound(&self) {
        let result = Notification::new()
            .summary("Pomodoro")
            .hint(notify_rust::Hint::SoundName("message-new-instant".to_string()))
            .hint(notify_rust::Hint::Transient(true))
            .show();
        if let Err(error) = result {
            log::warn!("sound cue failed: {error}");
        }
    }
}
