//! Config command - show the effective configuration and where it lives

use anyhow::Result;
use clap::Args;
use objscope_core::config;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write the defaults to the config file if none exists
    #[arg(long)]
    pub init: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let path = config::config_path();
    match &path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory on this platform"),
    }

    if args.init
        && let Some(path) = &path
        && !path.exists()
    {
        config::save_to(path, &config::InspectorConfig::default())?;
        println!("# wrote defaults");
    }

    let config = config::load();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
