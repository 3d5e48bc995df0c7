//! Tell the user about a new aircraft.
//!
//! Notifications are fire-and-forget, a notifier must never fail the cycle.
//!

use std::fmt::Debug;
use std::io::{self, Write};

use tracing::{info, warn};

pub trait Notifier: Debug + Send {
    fn notify(&self, title: &str, message: &str, link: &str);
}

/// Print on the terminal
///
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        ConsoleNotifier
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str, link: &str) {
        info!("NEW: {title} ({message})");

        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "\n✈️  NEW: {title}\n    {message}\n    View: {link}") {
            warn!("can not notify: {e}");
        }
    }
}
