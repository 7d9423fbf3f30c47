use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use skcris_core::DatasetType;

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "skcris", version, about = "Scrape the Slovak research registry (SKCRIS)")]
pub struct Cli {
    #[arg(long, short, help = "RON file with the scrape input")]
    pub input: Option<PathBuf>,
    #[arg(long, value_enum, help = "Scrape a whole dataset instead of start URLs")]
    pub dataset: Option<DatasetArg>,
    #[arg(long = "start-url", help = "Listing or detail URL to start from (repeatable)")]
    pub start_urls: Vec<String>,
    #[arg(long, help = "Stop after this many entries")]
    pub max_entries: Option<usize>,
    #[arg(long, default_value_t = false, help = "Only log how many entries match")]
    pub count_only: bool,
    #[arg(long, default_value_t = false, help = "Fetch linked resources of every entry")]
    pub linked: bool,
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
    #[arg(long, help = "Dataset file name without extension")]
    pub dataset_name: Option<String>,
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatasetArg {
    Researchers,
    Projects,
    Organisations,
}

impl From<DatasetArg> for DatasetType {
    fn from(value: DatasetArg) -> Self {
        match value {
            DatasetArg::Researchers => DatasetType::Researchers,
            DatasetArg::Projects => DatasetType::Projects,
            DatasetArg::Organisations => DatasetType::Organisations,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(value: LogTarget) -> Self {
        match value {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
