use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use simplelog::{Config, LevelFilter, WriteLogger};

use folioscope::app::{run_app_with_event_source, App};
use folioscope::document;
use folioscope::event_source::TerminalEventSource;
use folioscope::sections;
use folioscope::settings::Settings;

#[derive(Parser)]
#[command(
    name = "folioscope",
    about = "A terminal portfolio/CV viewer with an image lightbox"
)]
struct Cli {
    /// Portfolio document to display
    document: PathBuf,

    /// Verbose logging to folioscope.log
    #[arg(long)]
    debug: bool,

    /// Ignore *.section.json files next to the document
    #[arg(long)]
    no_sections: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), File::create("folioscope.log")?)?;
    info!("starting folioscope");

    let settings = Settings::load();
    let doc = document::load_document(&cli.document)?;
    let mut app = App::new(doc, settings);
    if !cli.no_sections {
        app = app.with_sections(sections::spawn_loader(&cli.document));
    }

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = TerminalEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("application error: {err:?}");
        println!("{err:?}");
    }

    info!("shutting down folioscope");
    Ok(())
}
