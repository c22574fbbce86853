// Status indicator collaborator. The orchestrator flips it around each
// delivery cycle; everything behind the trait is hardware glue.

/// On/off indicator reflecting connectivity state.
pub trait StatusIndicator: Send + Sync {
    fn turn_on(&self);
    fn turn_off(&self);
}

/// Indicator that only logs transitions, for targets without a wired LED.
#[derive(Debug, Default)]
pub struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn turn_on(&self) {
        tracing::debug!("Status indicator on");
    }

    fn turn_off(&self) {
        tracing::debug!("Status indicator off");
    }
}
