use std::io::{self, IsTerminal, Write};

use fixer_engine::{ButtonPhase, HostButton};
use fixer_logging::fixer_info;

const IDLE_LABEL: &str = "Fix model paths";

/// Redraws a one-line status on an interactive stderr.
pub(crate) struct StatusLineButton {
    shown: bool,
}

impl HostButton for StatusLineButton {
    fn set_phase(&mut self, phase: ButtonPhase) {
        let mut err = io::stderr().lock();
        let label = phase.label().unwrap_or_else(|| IDLE_LABEL.to_string());
        let marker = if phase.is_busy() { "*" } else { " " };
        let _ = write!(err, "\r\x1b[2K[{marker}] {label}");
        if phase == ButtonPhase::Idle && self.shown {
            let _ = writeln!(err);
            self.shown = false;
        } else {
            self.shown = true;
        }
        let _ = err.flush();
    }
}

/// Reports phases through the log when nobody watches a terminal.
pub(crate) struct LogButton;

impl HostButton for LogButton {
    fn set_phase(&mut self, phase: ButtonPhase) {
        match phase.label() {
            Some(label) => fixer_info!("{}", label),
            None => fixer_info!("{}: idle", IDLE_LABEL),
        }
    }
}

pub(crate) fn host_button() -> Box<dyn HostButton> {
    if io::stderr().is_terminal() {
        Box::new(StatusLineButton { shown: false })
    } else {
        Box::new(LogButton)
    }
}
