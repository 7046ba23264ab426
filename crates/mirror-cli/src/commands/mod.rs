//! CLI subcommands.

pub mod config;
pub mod entries;
pub mod extract;

use std::fs;
use std::path::Path;

use mirror_core::Provider;

/// Provider selected on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ProviderArg {
    Reddit,
    Instagram,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Reddit => Provider::Reddit,
            ProviderArg::Instagram => Provider::Instagram,
        }
    }
}

/// Read an export archive from disk.
pub fn read_archive(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read(path)?)
}
