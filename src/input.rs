use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::app::App;
use crate::AppResult;

#[derive(Debug)]
pub enum InputMessage {
    Event(event::Event),
    ReadError(String),
}

pub type InputReceiver = Receiver<InputMessage>;

/// Blocking reader on its own thread; the frame loop drains the channel
/// without ever stalling on input.
pub fn spawn_input_thread() -> InputReceiver {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(InputMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Err(err) => {
                let _ = tx.send(InputMessage::ReadError(err.to_string()));
                break;
            }
        }
    });
    rx
}

/// Drain all pending events. Returns true when the app should quit.
pub fn drain_input_events(app: &mut App, input_rx: &InputReceiver) -> AppResult<bool> {
    loop {
        match input_rx.try_recv() {
            Ok(InputMessage::Event(event)) => {
                handle_input_event(app, event);
                if app.quit {
                    return Ok(true);
                }
            }
            Ok(InputMessage::ReadError(err)) => {
                return Err(format!("input thread read failed: {err}").into());
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                return Err("input channel disconnected".into());
            }
        }
    }

    Ok(app.quit)
}

pub fn handle_input_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key_event) => {
            if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return;
            }
            match key_event.code {
                KeyCode::Esc => app.quit = true,
                KeyCode::Tab => app.toggle_hud(),
                KeyCode::Char(' ') => app.toggle_running(),
                KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_speed(1.25),
                KeyCode::Char('-') | KeyCode::Char('_') => app.adjust_speed(1.0 / 1.25),
                KeyCode::Char(c) => match c.to_ascii_lowercase() {
                    'q' => app.quit = true,
                    'm' => {
                        app.toggle_monochrome();
                    }
                    't' => app.toggle_theme(),
                    'h' => app.toggle_halftone(),
                    'v' => app.toggle_style(),
                    _ => {}
                },
                _ => {}
            }
        }
        // Terminal focus doubles as the visibility signal.
        Event::FocusGained => app.set_visible(true),
        Event::FocusLost => app.set_visible(false),
        Event::Resize(_, _) => app.refresh_dimensions(),
        _ => {}
    }
}
