use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use toxiguard::app::run_monitor_command;
use toxiguard::audio::capture::list_devices;
use toxiguard::cli::{Cli, Commands};
use toxiguard::config::Config;
use toxiguard::diagnostics::check_dependencies;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            if let Err(e) = run_monitor_command(
                config,
                cli.device,
                cli.model,
                cli.language,
                cli.output_dir,
                cli.window,
                cli.interval,
                cli.quiet,
                cli.verbose,
                cli.once,
            )
            .await
            {
                eprintln!("{}", format!("Error: {}", e).red());
                std::process::exit(1);
            }
        }
        Some(Commands::Devices) => {
            list_capture_devices()?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?.with_env_overrides();
            check_dependencies(&config);
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/toxiguard/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}

/// List available capture devices.
fn list_capture_devices() -> Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        eprintln!("No capture devices found");
        std::process::exit(1);
    }

    println!("Available capture devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}
