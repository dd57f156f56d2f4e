use crossterm::{
    cursor,
    event::DisableFocusChange,
    execute,
    style::ResetColor,
    terminal::{self, ClearType, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Write};
use std::panic;

use crate::AppResult;

/// Restore the terminal even when a frame panics mid-draw; without this a
/// panic leaves the user in a raw-mode alternate screen.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let raw_mode_result = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let cleanup_result = execute!(
            stdout,
            ResetColor,
            cursor::Show,
            LeaveAlternateScreen,
            terminal::Clear(ClearType::All)
        );
        if raw_mode_result.is_err() || cleanup_result.is_err() {
            let mut stderr = io::stderr();
            let _ = writeln!(
                stderr,
                "panic cleanup fallback: writing terminal reset escape sequences"
            );
            let _ = stderr.write_all(b"\x1b[?1049l\x1b[?25h\x1b[0m");
            let _ = stderr.flush();
        }
        default_hook(panic_info);
    }));
}

pub fn cleanup_terminal(stdout: &mut BufWriter<io::Stdout>) -> AppResult<()> {
    let _ = execute!(stdout, DisableFocusChange);
    execute!(
        stdout,
        ResetColor,
        cursor::Show,
        LeaveAlternateScreen,
        terminal::Clear(ClearType::All)
    )?;
    stdout.flush()?;
    crossterm::terminal::disable_raw_mode()?;
    Ok(())
}
