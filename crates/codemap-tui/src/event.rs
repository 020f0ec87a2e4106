use crate::app::App;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

/// Applies finished background work, then waits briefly for one key press.
pub fn handle_events(app: &mut App) -> Result<()> {
    app.update();

    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.on_key(key);
            }
        }
    }
    Ok(())
}
