mod input;
mod runtime;
mod ui;

use anyhow::Result;
use clap::Parser;
use moodlens_core::{tracing_setup, CoreConfig};

use crate::runtime::run_app;
use crate::ui::App;

#[derive(Parser)]
#[command(name = "moodlens-tui", about = "Terminal admin dashboard for the diary service")]
struct Args {
    /// Path to a config file (defaults to ~/.config/moodlens/config.json)
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Restore the terminal before the panic message prints, or it is lost to
    // the alternate screen.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ui::restore_terminal();
        eprintln!("{panic_info}");
        original_hook(panic_info);
    }));

    tracing_setup::init_tracing();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CoreConfig::from_file(path)
            .ok_or_else(|| anyhow::anyhow!("could not read config file {}", path.display()))?,
        None => CoreConfig::load(),
    };

    let mut app = App::new(config);
    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app).await;
    ui::restore_terminal()?;
    result
}
