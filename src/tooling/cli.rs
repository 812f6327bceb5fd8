//! CLI Tooling
//!
//! Command-line transport for the store and dispatcher: run single commands,
//! an interactive shell, and direct store queries.

use crate::bag::{AttributeBag, VersionStamp};
use crate::builtin;
use crate::config::{ConfigLoader, SatchelConfig};
use crate::dispatch::{Dispatch, Dispatcher, Event};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::registry::{scan_directory, Registry};
use crate::store::{codec, FindOptions, Selector, StoreRoot, TimeWindow, VersionedStore};
use crate::tooling::shell;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// satchel - versioned attribute store with a command dispatcher
#[derive(Parser, Debug)]
#[command(name = "satchel")]
#[command(about = "Versioned attribute store with a textual command dispatcher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Working directory (holds the optional satchel.toml)
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store root directory (overrides store.root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Shorthand for --log-level debug
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings with the command-line flags applied on top
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Dispatch one command line and print its replies
    Exec {
        /// Command and arguments, e.g. `log buy milk`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Read commands from stdin, one per line
    Shell,
    /// List the current version of every matching instance
    Find {
        /// Type name (case-insensitive, bare or qualified)
        kind: String,
        /// Field filter `key=substring`; an instance matches if any filter does
        #[arg(long = "select", short = 's')]
        select: Vec<String>,
        /// Only versions at or after this time (`YYYY-MM-DD[/HH:MM:SS[.ffffff]]`)
        #[arg(long)]
        from: Option<String>,
        /// Only versions at or before this time
        #[arg(long)]
        to: Option<String>,
        /// Hide soft-deleted instances
        #[arg(long)]
        skip_deleted: bool,
        /// Keep only the n-th result (0-based)
        #[arg(long)]
        index: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print one stored version by handle or artifact path
    Show {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List registered and stored types
    Types {
        /// Case-insensitive substring filter
        filter: Option<String>,
    },
    /// List registered commands
    #[command(name = "commands")]
    ListCommands,
    /// List loadable modules in a directory
    Modules { dir: PathBuf },
    /// Print the effective configuration as TOML
    Config,
}

/// CLI context holding the loaded configuration and a ready dispatcher
pub struct CliContext {
    config: SatchelConfig,
    workdir: PathBuf,
    store_root: PathBuf,
    dispatcher: Arc<Dispatcher>,
}

impl CliContext {
    /// Effective configuration: an explicit file or the layered sources, with
    /// `--root` applied on top
    pub fn load_config(
        workdir: &Path,
        config_path: Option<&Path>,
        root_override: Option<PathBuf>,
    ) -> Result<SatchelConfig, ApiError> {
        let mut config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workdir)?,
        };
        if let Some(root) = root_override {
            config.store.root = Some(root);
        }
        Ok(config)
    }

    /// Register the built-in module and open the configured store
    pub fn from_config(workdir: PathBuf, config: SatchelConfig) -> Result<Self, ApiError> {
        let store_root = config.store.resolve_root(&workdir)?;

        let registry = Arc::new(Registry::with_policy(config.dispatch.scan_policy()));
        let report = registry.scan_module(&builtin::module());
        info!(
            types = report.types.len(),
            commands = report.commands.len(),
            "built-in module registered"
        );

        let root = Arc::new(StoreRoot::unset());
        root.set(store_root.clone())?;
        let store = VersionedStore::filesystem(
            root,
            config.store.colon_substitute,
            Arc::clone(registry.types()),
        );

        Ok(Self {
            config,
            workdir,
            store_root,
            dispatcher: Arc::new(Dispatcher::new(registry, Arc::new(store))),
        })
    }

    pub fn config(&self) -> &SatchelConfig {
        &self.config
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn store(&self) -> &VersionedStore {
        self.dispatcher.store()
    }

    /// Execute a CLI command and return what should be printed
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Exec { words } => self.exec(&words.join(" ")),
            Commands::Shell => {
                let stats = shell::run(
                    Arc::clone(&self.dispatcher),
                    self.config.dispatch.workers,
                    std::io::BufReader::new(std::io::stdin()),
                    std::io::stdout(),
                )
                .await?;
                info!(?stats, "shell finished");
                Ok(String::new())
            }
            Commands::Find {
                kind,
                select,
                from,
                to,
                skip_deleted,
                index,
                format,
            } => {
                let window = TimeWindow {
                    from: from.as_deref().map(parse_time).transpose()?,
                    to: to.as_deref().map(parse_time).transpose()?,
                };
                let mut options = FindOptions::new()
                    .selector(Selector::from_pairs(select.iter().map(String::as_str)))
                    .window(window)
                    .skip_deleted(*skip_deleted);
                if let Some(nth) = index {
                    options = options.index(*nth);
                }
                let bags = self.store().find(kind, &options)?;
                format_bags(&bags, format)
            }
            Commands::Show { path, format } => {
                let bag = self.store().read(path)?;
                format_bag(&bag, format)
            }
            Commands::Types { filter } => self.types(filter.as_deref()),
            Commands::ListCommands => {
                let mut table = Table::new();
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.set_header(vec!["Command", "Handler"]);
                let commands = self.dispatcher.registry().commands();
                for name in commands.names() {
                    if let Some(entry) = commands.get(&name) {
                        table.add_row(vec![entry.name, entry.qualified]);
                    }
                }
                Ok(table.to_string())
            }
            Commands::Modules { dir } => {
                let dir = if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.workdir.join(dir)
                };
                Ok(scan_directory(&dir)
                    .into_iter()
                    .map(|(package, module)| format!("{}.{}", package, module))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    /// Dispatch one line; unknown commands are an error
    pub fn exec(&self, line: &str) -> Result<String, ApiError> {
        let mut event = Event::parse(line).with_origin("cli");
        match self.dispatcher.dispatch(&mut event) {
            Dispatch::Unknown => Err(ApiError::UnknownCommand(event.command)),
            _ => Ok(event.replies().join("\n")),
        }
    }

    fn types(&self, filter: Option<&str>) -> Result<String, ApiError> {
        let registered: BTreeSet<String> = self
            .dispatcher
            .registry()
            .types()
            .names()
            .into_iter()
            .collect();
        let stored: BTreeSet<String> = self.store().type_tags(None)?.into_iter().collect();
        let wanted = filter.map(str::to_lowercase);

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Type", "Registered", "Stored"]);
        for name in registered.union(&stored) {
            if let Some(wanted) = &wanted {
                if !name.to_lowercase().contains(wanted.as_str()) {
                    continue;
                }
            }
            let mark = |present: bool| if present { "yes" } else { "-" };
            table.add_row(vec![
                name.as_str(),
                mark(registered.contains(name)),
                mark(stored.contains(name)),
            ]);
        }
        Ok(table.to_string())
    }
}

fn parse_time(input: &str) -> Result<VersionStamp, ApiError> {
    VersionStamp::parse(input)
        .ok_or_else(|| ApiError::ConfigError(format!("Invalid time '{}'", input)))
}

fn bag_json(bag: &AttributeBag) -> serde_json::Value {
    serde_json::json!({
        "handle": bag.handle().map(|h| h.to_string()),
        "fields": bag.fields(),
    })
}

fn render_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON: {}", e)))
}

fn format_bags(bags: &[AttributeBag], format: &str) -> Result<String, ApiError> {
    match format {
        "json" => render_json(&serde_json::Value::Array(bags.iter().map(bag_json).collect())),
        "text" => {
            if bags.is_empty() {
                return Ok("no result".to_string());
            }
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "Handle", "Fields"]);
            for (nr, bag) in bags.iter().enumerate() {
                let handle = bag.handle().map(|h| h.to_string()).unwrap_or_default();
                table.add_row(vec![nr.to_string(), handle, bag.printable(None, &[], false)]);
            }
            Ok(table.to_string())
        }
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn format_bag(bag: &AttributeBag, format: &str) -> Result<String, ApiError> {
    match format {
        "json" => render_json(&bag_json(bag)),
        "text" => {
            let body = codec::encode(bag.fields())
                .map_err(|e| ApiError::ConfigError(format!("Failed to render fields: {}", e)))?;
            let handle = bag.handle().map(|h| h.to_string()).unwrap_or_default();
            Ok(format!("{}\n{}", handle, String::from_utf8_lossy(&body)))
        }
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}
