//! tradelines — terminal chart host for the order engine.
//!
//! Renders order lines over a synthetic price feed and drives the full
//! interaction surface: mouse drag-to-reprice, cancel affordance clicks,
//! keyboard order entry, theme switching, and JSON order persistence.

mod app;
mod chart;
mod host;
mod input;
mod sample_data;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tradelines_core::{persistence, ThemePatch};

use crate::app::AppState;

#[derive(Parser, Debug)]
#[command(name = "tradelines", about = "Order lines on a terminal price chart")]
struct Args {
    /// Instrument symbol shown in the chart title.
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Seed for the synthetic price feed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting price for the feed.
    #[arg(long, default_value_t = 100.0)]
    start_price: f64,

    /// Use the light theme preset.
    #[arg(long)]
    light: bool,

    /// TOML file with partial style overrides, merged over the preset.
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Order file to load on start and save on exit. Defaults to the
    /// user config directory.
    #[arg(long)]
    orders: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    let orders_path = args.orders.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tradelines")
            .join("orders.json")
    });

    let mut app = AppState::new(
        args.symbol,
        args.seed,
        args.start_price,
        !args.light,
        orders_path.clone(),
    );

    if let Some(theme_path) = &args.theme {
        let content = std::fs::read_to_string(theme_path)
            .with_context(|| format!("reading theme file {}", theme_path.display()))?;
        let patch: ThemePatch = toml::from_str(&content)
            .with_context(|| format!("parsing theme file {}", theme_path.display()))?;
        app.engine.merge_theme(&patch);
    }

    if orders_path.exists() {
        match persistence::load_orders(&orders_path, &mut app.engine) {
            Ok(outcome) => app.set_status(format!(
                "loaded {} order(s), {} rejected",
                outcome.imported, outcome.rejected
            )),
            Err(err) => app.set_error(format!("order file ignored: {err}")),
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save orders before exit
    let _ = persistence::save_orders(&orders_path, &app.engine);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render (also rebuilds the mouse hit map)
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Poll for input events (50ms timeout doubles as the feed tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        } else {
            app.tick();
        }

        // 3. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
