use std::time::Duration;

use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize(u16, u16),
    /// Bracketed paste, delivered as one chunk.
    Paste(String),
}

/// Read crossterm events on a background thread and forward them. The thread
/// exits once the receiving side is gone.
pub fn spawn_input_reader(tx: UnboundedSender<Event>) {
    std::thread::spawn(move || loop {
        let event = if crossterm::event::poll(Duration::from_millis(16)).unwrap_or(false) {
            match crossterm::event::read() {
                Ok(crossterm::event::Event::Key(key)) => Event::Key(key),
                Ok(crossterm::event::Event::Mouse(mouse)) => Event::Mouse(mouse),
                Ok(crossterm::event::Event::Resize(w, h)) => Event::Resize(w, h),
                Ok(crossterm::event::Event::Paste(text)) => Event::Paste(text),
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "reading terminal input failed");
                    break;
                }
            }
        } else {
            Event::Tick
        };
        if tx.send(event).is_err() {
            break;
        }
    });
}
