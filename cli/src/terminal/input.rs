use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use camprobe_core::session::StopHandle;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stops the scan when `q` or Ctrl-C is pressed.
///
/// Raw mode swallows the terminal's own Ctrl-C handling, so the key is
/// caught here instead. The listener ends with the handle.
pub struct InputHandle {
    done: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// `None` when stdin is not an interactive terminal.
    pub fn start(stop: StopHandle) -> Option<Self> {
        if !std::io::stdin().is_terminal() || enable_raw_mode().is_err() {
            return None;
        }

        let done = Arc::new(AtomicBool::new(false));
        let finished = done.clone();
        let thread = thread::spawn(move || {
            while !finished.load(Ordering::Relaxed) {
                if !matches!(event::poll(POLL_INTERVAL), Ok(true)) {
                    continue;
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        stop.stop();
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Some(Self {
            done,
            thread: Some(thread),
        })
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        let _ = disable_raw_mode();
    }
}
