use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config;
use crate::ui;

/// What a key press asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum KeyAction {
    Play,
    Toggle,
    Stop,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Reload,
    Quit,
}

fn key_action(code: KeyCode) -> Option<KeyAction> {
    let action = match code {
        KeyCode::Enter => KeyAction::Play,
        KeyCode::Char(' ') | KeyCode::Char('p') => KeyAction::Toggle,
        KeyCode::Char('s') => KeyAction::Stop,
        KeyCode::Char('l') | KeyCode::Char('n') => KeyAction::Next,
        KeyCode::Char('h') | KeyCode::Char('b') => KeyAction::Previous,
        KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::VolumeUp,
        KeyCode::Char('-') => KeyAction::VolumeDown,
        KeyCode::Char('r') => KeyAction::Reload,
        KeyCode::Char('q') => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Consume a pending update from the worker, then refresh transport fields.
fn refresh(app: &mut App, player: &AudioPlayer) {
    if let Some(np) = player.take_update() {
        app.apply_update(np);
    }
    app.sync_transport(player.is_playing(), player.position(), player.volume());
}

/// Main terminal event loop. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &AudioPlayer,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll = Duration::from_millis(settings.ui.poll_ms);
    loop {
        refresh(app, player);
        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(poll)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the loop should exit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &AudioPlayer,
) -> bool {
    let Some(action) = key_action(key.code) else {
        return false;
    };
    let result = match action {
        KeyAction::Quit => return true,
        KeyAction::Play => player.play(),
        KeyAction::Toggle => player.toggle(),
        KeyAction::Stop => player.stop(),
        KeyAction::Next => player.next(),
        KeyAction::Previous => player.previous(),
        KeyAction::VolumeUp => {
            app.volume = app.volume_up(settings.ui.volume_step);
            player.set_volume(app.volume)
        }
        KeyAction::VolumeDown => {
            app.volume = app.volume_down(settings.ui.volume_step);
            player.set_volume(app.volume)
        }
        KeyAction::Reload => player.load_directory(app.dir.clone()),
    };
    app.report(result);
    false
}
