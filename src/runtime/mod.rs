use std::env;
use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::audio::AudioPlayer;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let settings = settings::load_settings();

    let dir = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(dir = %dir.display(), "starting");

    let audio_player = AudioPlayer::new(&settings);
    let mut app = App::new(dir.clone());
    app.report(audio_player.set_volume(settings.audio.volume));
    app.report(audio_player.load_directory(dir));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &audio_player);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    audio_player.shutdown();
    run_result
}
