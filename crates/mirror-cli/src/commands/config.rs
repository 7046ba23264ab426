//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use mirror_core::MirrorConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "providers.reddit.votes")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file (default: the active config path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let location = ConfigLocation::resolve(config_path);

    match args.command {
        ConfigCommand::Show => show_config(&location),
        ConfigCommand::Init(init_args) => init_config(&location, init_args),
        ConfigCommand::Get { key } => get_config(&location, &key),
        ConfigCommand::Set { key, value } => set_config(&location, &key, &value),
        ConfigCommand::Path => show_path(&location),
    }
}

/// The config file a command operates on: `--config` if given, else the
/// per-user default.
struct ConfigLocation {
    path: PathBuf,
    explicit: bool,
}

impl ConfigLocation {
    fn resolve(explicit: Option<&str>) -> Self {
        match explicit {
            Some(path) => Self {
                path: PathBuf::from(path),
                explicit: true,
            },
            None => Self {
                path: default_config_path(),
                explicit: false,
            },
        }
    }

    /// Read the file, if it exists.
    fn read(&self) -> anyhow::Result<Option<MirrorConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        debug!("Loading config from {}", self.path.display());
        Ok(Some(MirrorConfig::from_file(&self.path)?))
    }

    fn read_or_default(&self) -> anyhow::Result<MirrorConfig> {
        Ok(self.read()?.unwrap_or_default())
    }

    fn write(&self, config: &MirrorConfig) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save(&self.path)?;
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mirror")
        .join("config.json")
}

/// Load the configuration used by the extraction commands.
///
/// An explicit path must exist; the default file falls back to built-in
/// defaults when absent.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<MirrorConfig> {
    let location = ConfigLocation::resolve(explicit);
    match location.read()? {
        Some(config) => Ok(config),
        None if location.explicit => {
            anyhow::bail!("Config file not found: {}", location.path.display())
        }
        None => Ok(MirrorConfig::default()),
    }
}

/// Directory records are saved to.
pub fn data_dir(config: &MirrorConfig) -> PathBuf {
    config.storage.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mirror")
    })
}

/// `a.b.c` as a JSON pointer (`/a/b/c`).
fn pointer(key: &str) -> String {
    key.split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn show_config(location: &ConfigLocation) -> anyhow::Result<()> {
    let config = match location.read()? {
        Some(config) => config,
        None => {
            println!(
                "{} No config file at {}, showing defaults.",
                style("ℹ").blue(),
                location.path.display()
            );
            MirrorConfig::default()
        }
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(location: &ConfigLocation, args: InitArgs) -> anyhow::Result<()> {
    let target = match args.output {
        Some(path) => ConfigLocation {
            path,
            explicit: true,
        },
        None => ConfigLocation {
            path: location.path.clone(),
            explicit: location.explicit,
        },
    };

    if target.path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            target.path.display()
        );
    }

    target.write(&MirrorConfig::default())?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        target.path.display()
    );
    Ok(())
}

fn get_config(location: &ConfigLocation, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(location.read_or_default()?)?;

    let value = json
        .pointer(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(location: &ConfigLocation, key: &str, value: &str) -> anyhow::Result<()> {
    // Bare words are stored as strings.
    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(location.read_or_default()?)?;

    let (parent, field) = match key.rsplit_once('.') {
        Some((parent, field)) => (pointer(parent), field),
        None => (String::new(), key),
    };
    let section = json
        .pointer_mut(&parent)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
    section.insert(field.to_string(), parsed.clone());

    let config: MirrorConfig = serde_json::from_value(json)?;
    location.write(&config)?;

    println!(
        "{} Set {} = {} in {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed)?,
        location.path.display()
    );
    Ok(())
}

fn show_path(location: &ConfigLocation) -> anyhow::Result<()> {
    println!("Configuration file: {}", location.path.display());

    if location.path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'mirror config init' to create a configuration file.");
    }
    Ok(())
}
