use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stop request shared between the signal handler and the display loop
#[derive(Debug, Clone, Default)]
pub struct SignalOfStop {
    closing: Arc<AtomicBool>,
}

impl SignalOfStop {
    pub fn new() -> SignalOfStop {
        SignalOfStop::default()
    }

    pub fn cancel(&self) {
        self.closing.store(true, Ordering::Relaxed);
    }

    pub fn cancelled(&self) -> bool {
        self.closing.load(Ordering::Relaxed)
    }

    /// Arm a Ctrl-C / SIGTERM handler that cancels this signal
    pub fn install_ctrlc(&self) -> Result<(), ctrlc::Error> {
        let signal = self.clone();
        ctrlc::set_handler(move || {
            log::info!("Interrupt received, shutting down");
            signal.cancel();
        })
    }
}
