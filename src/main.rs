//! Hand gesture mouse control: webcam hand tracking drives the pointer.

use anyhow::{Context, Result};
use clap::Parser;
use hand_mouse::{
    app::{App, AppOptions},
    config::Config,
    store::Language,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Profile to run (default, touch, scroll, or one from the profile file), or `help`
    mode: Option<String>,

    /// Interface language (saved for next time)
    #[arg(short, long, value_enum)]
    lang: Option<Language>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Directory with profile, gesture, settings and text JSON files
    #[arg(long, default_value = "res")]
    res_dir: PathBuf,

    /// Camera index to use (overrides the config file)
    #[arg(long)]
    cam: Option<i32>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Log pointer actions instead of moving the real cursor
    #[arg(long)]
    dry_run: bool,

    /// Do not open a preview window
    #[arg(long)]
    headless: bool,

    /// Wait for toggle_camera events on stdin and report status on stdout
    #[arg(long)]
    control_stdio: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Mouse {}", env!("CARGO_PKG_VERSION"));

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    config.validate().context("Invalid configuration")?;

    let options = AppOptions {
        mode: args.mode,
        lang: args.lang,
        res_dir: args.res_dir,
        camera_index: args.cam,
        dry_run: args.dry_run,
        headless: args.headless,
        control_stdio: args.control_stdio,
    };

    let app = App::new(config, options).context("Failed to initialize")?;
    app.run().context("Failed to start the camera pipeline")?;

    Ok(())
}
