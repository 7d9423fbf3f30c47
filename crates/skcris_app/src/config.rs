use std::fs;
use std::path::Path;

use anyhow::Context;
use skcris_core::ScrapeInput;

use crate::cli::Cli;

/// Reads the RON input file, or starts from defaults when none is given,
/// then lets command-line flags override it.
pub fn load_input(cli: &Cli) -> anyhow::Result<ScrapeInput> {
    let mut input = match &cli.input {
        Some(path) => read_input(path)?,
        None => ScrapeInput::default(),
    };
    apply_overrides(&mut input, cli);
    input.validate()?;
    Ok(input)
}

pub fn read_input(path: &Path) -> anyhow::Result<ScrapeInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read input file {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("cannot parse input file {}", path.display()))
}

fn apply_overrides(input: &mut ScrapeInput, cli: &Cli) {
    if let Some(dataset) = cli.dataset {
        input.dataset_type = Some(dataset.into());
    }
    if !cli.start_urls.is_empty() {
        input.start_urls = Some(cli.start_urls.clone());
    }
    if cli.max_entries.is_some() {
        input.output_max_entries = cli.max_entries;
    }
    if cli.count_only {
        input.listing_count_only = true;
    }
    if cli.linked {
        input.entry_include_linked_resources = true;
    }
}

/// File name of the written dataset: the explicit name, else the dataset type.
pub fn dataset_name(cli: &Cli, input: &ScrapeInput) -> String {
    if let Some(name) = &cli.dataset_name {
        return name.clone();
    }
    match input.dataset_type {
        Some(dataset) => format!("{dataset:?}").to_lowercase(),
        None => "skcris".to_string(),
    }
}
