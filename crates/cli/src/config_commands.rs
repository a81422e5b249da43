use std::path::{Path, PathBuf};

use {
    anyhow::bail,
    chatlog_config::{ChatlogConfig, find_or_default_config_path, save_config},
    clap::Subcommand,
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config(
    config: &ChatlogConfig,
    path: Option<&Path>,
    action: ConfigAction,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", render(config)?);
            Ok(())
        },
        ConfigAction::Init { force } => {
            let target = path.map_or_else(find_or_default_config_path, Path::to_path_buf);
            let written = init(&target, force)?;
            println!("Wrote {}", written.display());
            Ok(())
        },
    }
}

fn render(config: &ChatlogConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))
}

fn init(target: &Path, force: bool) -> anyhow::Result<PathBuf> {
    if target.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            target.display()
        );
    }
    save_config(&ChatlogConfig::default(), target)?;
    Ok(target.to_path_buf())
}
