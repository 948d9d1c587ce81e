//! triptych - three-channel control module simulator
//!
//! Run with: cargo run

mod app;
mod ui;

use app::App;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // Logging stays quiet unless RUST_LOG asks for it; the terminal belongs
    // to the TUI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut terminal = ratatui::init();
    let result = App::new().and_then(|mut app| app.run(&mut terminal));
    ratatui::restore();
    result
}
