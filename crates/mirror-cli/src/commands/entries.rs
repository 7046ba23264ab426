//! Entries command - list the archive entries a provider would read.

use std::path::PathBuf;

use clap::Args;
use console::style;

use mirror_core::{ArchiveReader, Provider, Providers};

use super::{config::load_config, read_archive, ProviderArg};

/// Arguments for the entries command.
#[derive(Args)]
pub struct EntriesArgs {
    /// Export archive (zip)
    #[arg(required = true)]
    input: PathBuf,

    /// Export provider
    #[arg(short, long, value_enum)]
    provider: ProviderArg,

    /// Only show entries a rule reads
    #[arg(long)]
    matched: bool,
}

pub fn run(args: EntriesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let provider = Provider::from(args.provider);
    let providers = Providers::from_config(&config.providers);
    let reader = ArchiveReader::from_config(&config.archive);

    let data = read_archive(&args.input)?;
    let entries = match reader.kept_entries(data) {
        Ok(entries) => entries,
        Err(e) if e.is_invalid_format() => anyhow::bail!("invalid format"),
        Err(e) => return Err(e.into()),
    };

    let mut matched = 0;
    for entry in &entries {
        if providers.matches(provider, entry.name()) {
            matched += 1;
            println!("{} {} -> {}", style("✓").green(), entry.path, entry.name());
        } else if !args.matched {
            println!("{} {}", style("·").dim(), entry.path);
        }
    }

    let missing: Vec<&str> = providers
        .file_names(provider)
        .into_iter()
        .filter(|name| !entries.iter().any(|entry| entry.name() == *name))
        .collect();
    if !missing.is_empty() {
        eprintln!("{} Not in archive: {}", style("ℹ").blue(), missing.join(", "));
    }

    eprintln!(
        "{} {} of {} supported entries match {} rules",
        style("ℹ").blue(),
        matched,
        entries.len(),
        provider
    );

    Ok(())
}
