use parking_lot::Mutex;

/// Blocking user dialogs.
pub trait Dialogs: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// Headless dialogs: records every prompt and answers confirmations with a
/// fixed choice.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    confirm_answer: bool,
    alerts: Mutex<Vec<String>>,
    confirms: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            ..Default::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.lock().clone()
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts.lock().last().cloned()
    }
}

impl Dialogs for ScriptedDialogs {
    fn alert(&self, message: &str) {
        tracing::info!(message, "alert");
        self.alerts.lock().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().push(message.to_string());
        self.confirm_answer
    }
}
