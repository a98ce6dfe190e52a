// FILE: src/cli/mod.rs

mod config;
mod handlers;

pub use config::{ProjectConfig, ThemeEntry};

use crate::error::Result;
use crate::{BuildOptions, ThemeSource};
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub const DEFAULT_OUTPUT_FILE: &str = "www/template-data.json";

/// Project manifest whose `version` is the fallback release version
pub const PACKAGE_MANIFEST: &str = "package.json";

pub struct Cli {
    config: ProjectConfig,
    root: PathBuf,
    start_time: Instant,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            config: ProjectConfig::default(),
            root: PathBuf::from("."),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }
        if let Some(root) = matches.get_one::<String>("root") {
            self.root = PathBuf::from(root);
        }

        let result = match matches.subcommand() {
            Some(("build", sub_matches)) => handlers::handle_build_command(self, sub_matches),
            Some(("swatches", sub_matches)) => handlers::handle_swatches_command(self, sub_matches),
            Some(("icons", sub_matches)) => handlers::handle_icons_command(self, sub_matches),
            Some(("resolve", sub_matches)) => handlers::handle_resolve_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };

        log::debug!("Finished in {}ms", self.start_time.elapsed().as_millis());
        result
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("root")
                    .short('r')
                    .long("root")
                    .value_name("DIR")
                    .help("Project root that configured paths are relative to")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("build")
                    .about("Build the template data JSON from the variables and theme stylesheets")
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output JSON file"))
                    .arg(Arg::new("fixed-point").long("fixed-point").help("Follow reference chains to a literal and reject cycles").action(ArgAction::SetTrue))
                    .arg(Arg::new("release-version").long("release-version").value_name("VERSION").help("Release version exposed to templates"))
                    .arg(Arg::new("stats").long("stats").help("Show detailed build statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch the inputs and rebuild on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("swatches")
                    .about("List the color palette swatches")
                    .arg(Arg::new("theme").short('t').long("theme").value_name("NAME").help("Theme to list (defaults to the default table)"))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Output format")),
            )
            .subcommand(
                Command::new("icons")
                    .about("List the icon names")
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Output format")),
            )
            .subcommand(
                Command::new("resolve")
                    .about("Print the resolved value of one custom property")
                    .arg(Arg::new("name").help("Property name (--kebab, var(--kebab) or camelCase)").required(true).index(1))
                    .arg(Arg::new("theme").short('t').long("theme").value_name("NAME").help("Theme to look in (defaults to the default table)"))
                    .arg(Arg::new("fixed-point").long("fixed-point").help("Follow reference chains to a literal and reject cycles").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Check annotation blocks of CSS files for syntax errors")
                    .arg(Arg::new("input").help("CSS file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('R').long("recursive").help("Check all CSS files in directory recursively").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::new()
            .filter_level(log_level)
            .parse_default_env()
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    fn project_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Build options from the defaults, overridden by the configuration file
    pub fn build_options(&self) -> Result<BuildOptions> {
        let mut options = BuildOptions::default();

        if let Some(variables_file) = &self.config.variables_file {
            options.variables_file = PathBuf::from(variables_file);
        }
        if let Some(themes) = &self.config.themes {
            options.themes = themes
                .iter()
                .map(|theme| ThemeSource::new(theme.name.clone(), &theme.path))
                .collect();
        }
        if let Some(icons) = &self.config.icons_directory {
            options.icons_directory = Some(PathBuf::from(icons));
        }
        if let Some(mode) = self.config.resolution {
            options.resolution_mode = mode;
        }
        options.release_version = self
            .config
            .release_version
            .clone()
            .or_else(|| self.package_version());
        options.debug_mode = log::log_enabled!(log::Level::Debug);

        options.variables_file = self.project_path(&options.variables_file);
        for theme in &mut options.themes {
            theme.path = self.project_path(&theme.path);
        }
        options.icons_directory = options.icons_directory.map(|dir| self.project_path(dir));

        Ok(options)
    }

    /// `version` field of the project's `package.json`, if there is one
    fn package_version(&self) -> Option<String> {
        let manifest = self.root.join(PACKAGE_MANIFEST);
        let content = match fs::read_to_string(&manifest) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("No release version from {}: {}", manifest.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(package) => {
                let version = package.get("version")?.as_str()?.to_string();
                log::debug!("Release version {} from {}", version, manifest.display());
                Some(version)
            }
            Err(e) => {
                log::warn!("Ignoring malformed {}: {}", manifest.display(), e);
                None
            }
        }
    }

    /// Output file from `--output`, the configuration file or the default
    pub fn output_path(&self, cli_output: Option<&String>) -> PathBuf {
        match cli_output {
            Some(path) => PathBuf::from(path),
            None => self.project_path(
                self.config
                    .output_file
                    .as_deref()
                    .unwrap_or(DEFAULT_OUTPUT_FILE),
            ),
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}
