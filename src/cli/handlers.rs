// FILE: src/cli/handlers.rs
use crate::{
    build_theme_set, build_to_file, cli::OutputFormat, extract_blocks, parse_icons, BuildOptions,
    BuildStats, Declaration, PropertyTable, ResolutionMode, Result, Swatch, ThemeSet,
    TokenDocError,
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Instant;

// --- BUILD ---
pub fn handle_build_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let mut options = cli.build_options()?;
    if matches.get_flag("fixed-point") {
        options.resolution_mode = ResolutionMode::FixedPoint;
    }
    if let Some(version) = matches.get_one::<String>("release-version") {
        options.release_version = Some(version.clone());
    }
    let output_path = cli.output_path(matches.get_one::<String>("output"));

    if matches.get_flag("watch") {
        watch_and_build(&options, &output_path)
    } else {
        let stats = build_once(&options, &output_path)?;
        if matches.get_flag("stats") {
            print_detailed_stats(&stats)?;
        }
        Ok(())
    }
}

fn build_once(options: &BuildOptions, output_path: &Path) -> Result<BuildStats> {
    println!(
        "🔨 Building {} -> {}",
        options.variables_file.display(),
        output_path.display()
    );

    let build_start = Instant::now();
    let stats = build_to_file(options, output_path)?;
    let build_time = build_start.elapsed();

    println!("✅ Build successful!");
    println!("   Tables: {}", stats.table_count);
    println!("   Output: {} bytes", stats.output_size);
    println!("   Time: {}ms", build_time.as_millis());

    Ok(stats)
}

fn print_detailed_stats(stats: &BuildStats) -> Result<()> {
    println!("\n📊 Build Statistics:");
    println!("   Property tables: {}", stats.table_count);
    println!("   Declarations: {}", stats.declaration_count);
    println!("   References resolved: {}", stats.references_resolved);
    println!("   Swatches: {}", stats.swatch_count);
    println!("   Icons: {}", stats.icon_count);
    println!("   Output size: {} bytes", stats.output_size);
    println!("   Build time: {}ms", stats.build_time_ms);
    Ok(())
}

/// Directories handed to the watcher and the paths inside them that trigger a rebuild.
///
/// Input files are watched through their parent directory so that editors
/// replacing a file on save do not end the watch.
struct WatchPlan {
    directories: BTreeSet<PathBuf>,
    files: HashSet<PathBuf>,
    icon_directories: HashSet<PathBuf>,
}

impl WatchPlan {
    fn new(options: &BuildOptions) -> Self {
        let mut plan = WatchPlan {
            directories: BTreeSet::new(),
            files: HashSet::new(),
            icon_directories: HashSet::new(),
        };

        for path in options.watched_paths() {
            if path.is_dir() {
                match path.canonicalize() {
                    Ok(dir) => {
                        plan.directories.insert(dir.clone());
                        plan.icon_directories.insert(dir);
                    }
                    Err(e) => log::warn!("Not watching {}: {}", path.display(), e),
                }
                continue;
            }

            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            match (parent.canonicalize(), path.file_name()) {
                (Ok(dir), Some(name)) => {
                    plan.files.insert(dir.join(name));
                    plan.directories.insert(dir);
                }
                _ => log::warn!("Not watching {}: its directory does not exist", path.display()),
            }
        }

        plan
    }

    /// Whether a change to `path` affects the build
    fn triggers(&self, path: &Path) -> bool {
        if self.files.contains(path) || self.icon_directories.contains(path) {
            return true;
        }
        path.extension().map_or(false, |ext| ext == "svg")
            && path
                .parent()
                .map_or(false, |dir| self.icon_directories.contains(dir))
    }
}

fn watch_and_build(options: &BuildOptions, output_path: &Path) -> Result<()> {
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| TokenDocError::watch(format!("Failed to create file watcher: {}", e)))?;

    let plan = WatchPlan::new(options);
    for dir in &plan.directories {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| TokenDocError::watch(format!("Failed to watch {}: {}", dir.display(), e)))?;
        println!("👀 Watching {} for changes...", dir.display());
    }

    if let Err(e) = build_to_file(options, output_path) {
        eprintln!("❌ Initial build failed: {}", e);
    } else {
        println!("✅ Initial build successful");
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    continue;
                }
                let changed: Vec<&PathBuf> = event.paths.iter().filter(|p| plan.triggers(p)).collect();
                if changed.is_empty() {
                    log::trace!("Ignoring {:?} on {:?}", event.kind, event.paths);
                    continue;
                }
                for path in changed {
                    println!("🔄 File {} was {:?}, rebuilding...", path.display(), event.kind);
                }
                match build_to_file(options, output_path) {
                    Ok(stats) => {
                        println!(
                            "✅ Rebuilt successfully ({} bytes, {}ms)",
                            stats.output_size, stats.build_time_ms
                        );
                    }
                    Err(e) => eprintln!("❌ Build failed: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- SWATCHES ---
pub fn handle_swatches_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_options()?;
    let themes = build_theme_set(&options.variables_file, &options.themes, options.resolution_mode)?;
    let table = select_table(&themes, matches.get_one::<String>("theme"))?;
    let format = matches.get_one::<OutputFormat>("format").unwrap_or(&OutputFormat::Text);

    println!("{}", format_swatches(&table.swatches(), *format)?);
    Ok(())
}

fn select_table<'a>(themes: &'a ThemeSet, theme: Option<&String>) -> Result<&'a PropertyTable> {
    match theme {
        Some(name) => themes.get(name).ok_or_else(|| TokenDocError::unknown("theme", name.as_str())),
        None => themes
            .default_table()
            .ok_or_else(|| TokenDocError::unknown("theme", crate::DEFAULT_THEME_NAME)),
    }
}

pub fn format_swatches(swatches: &[Swatch], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(swatches),
        OutputFormat::Text => {
            let width = swatches.iter().map(|s| s.name.len()).max().unwrap_or(0);
            Ok(swatches
                .iter()
                .map(|s| format!("{:width$}  {}", s.name, s.color, width = width))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

// --- ICONS ---
pub fn handle_icons_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_options()?;
    let icons_dir = options
        .icons_directory
        .as_ref()
        .ok_or_else(|| TokenDocError::config("no icon directory configured"))?;
    let icons = parse_icons(icons_dir)?;
    let format = matches.get_one::<OutputFormat>("format").unwrap_or(&OutputFormat::Text);

    println!("{}", format_icons(&icons, *format)?);
    Ok(())
}

pub fn format_icons(icons: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(icons),
        OutputFormat::Text => Ok(icons.join("\n")),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| TokenDocError::InvalidFormat {
        message: format!("JSON serialization error: {}", e),
    })
}

// --- RESOLVE ---
pub fn handle_resolve_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let mut options = cli.build_options()?;
    if matches.get_flag("fixed-point") {
        options.resolution_mode = ResolutionMode::FixedPoint;
    }

    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| TokenDocError::config("a property name is required"))?;
    let decl = resolve_property(&options, matches.get_one::<String>("theme"), name)?;

    println!("{}", decl.resolved_value);
    if decl.original_value != decl.resolved_value {
        log::info!("{} = {} -> {}", decl.original_property, decl.original_value, decl.resolved_value);
    }
    Ok(())
}

/// Look up one property, written as `--kebab`, `var(--kebab)` or `camelCase`
fn resolve_property(options: &BuildOptions, theme: Option<&String>, name: &str) -> Result<Declaration> {
    let themes = build_theme_set(&options.variables_file, &options.themes, options.resolution_mode)?;
    let table = select_table(&themes, theme)?;
    table
        .lookup(name)
        .cloned()
        .ok_or_else(|| TokenDocError::unknown("property", name))
}

// --- CHECK ---
pub fn handle_check_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches
        .get_one::<String>("input")
        .ok_or_else(|| TokenDocError::config("an input path is required"))?;
    let recursive = matches.get_flag("recursive");

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(Path::new(input_path))
    } else {
        check_single_file(Path::new(input_path)).map(|_| ())
    }
}

/// Parse the annotation blocks of one file; returns (blocks, declarations)
fn check_single_file(input_path: &Path) -> Result<(usize, usize)> {
    println!("🔍 Checking {}", input_path.display());
    let file = input_path.to_string_lossy();

    let result = fs::read_to_string(input_path)
        .map_err(|e| TokenDocError::FileNotFound {
            path: format!("{}: {}", file, e),
        })
        .and_then(|content| extract_blocks(&content, &file));

    match result {
        Ok(blocks) => {
            let declarations = blocks.iter().map(|b| b.walk_declarations().count()).sum();
            println!(
                "✅ {} - {} blocks, {} declarations",
                file,
                blocks.len(),
                declarations
            );
            Ok((blocks.len(), declarations))
        }
        Err(e) => {
            println!("❌ {} - {}", file, e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &Path) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            TokenDocError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "css") {
            total_files += 1;
            if check_single_file(entry.path()).is_err() {
                error_files += 1;
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);

    if error_files > 0 {
        Err(TokenDocError::InvalidFormat {
            message: format!("{} of {} files have errors", error_files, total_files),
        })
    } else {
        Ok(())
    }
}
