mod charts;
mod render;
mod state;

pub use state::UiState;

use crate::app::AppContext;
use crate::store::RecordStore;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(200);

/// Runs the dashboard until the user quits.
///
/// Every tick polls the store for outside changes, applies pending
/// snapshots, expires the notification, redraws and handles at most one
/// input event.
pub fn run<S: RecordStore>(ctx: &mut AppContext<S>, mut state: UiState, source: &str) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| format!("Failed to initialize terminal: {}", e))?;

        state.sync_tables(ctx);

        loop {
            ctx.poll_store();
            if ctx.pump_snapshots() {
                state.sync_tables(ctx);
            }
            state.expire_notification(Instant::now());

            terminal
                .draw(|frame| render::draw(frame, ctx, &mut state, source))
                .map_err(|e| format!("Failed to draw terminal UI: {}", e))?;

            if event::poll(TICK).map_err(|e| format!("Failed to poll input: {}", e))? {
                if let Event::Key(key) = event::read().map_err(|e| format!("Failed to read input: {}", e))?
                    && state.handle_key(ctx, key, Instant::now())
                {
                    break;
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;

    result
}
