//! Logging initialization: ANSI console output plus JSON rotating log files,
//! with records routed to per-subsystem files by crate-name prefix.
//!
//! The `logging` config section maps subsystem names (crate names such as
//! `auth` or `inventory`) to console/file levels; the `default` key is the
//! catch-all for targets no explicit section claims.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, FileLimit};
use file_rotate::{ContentLimit, FileRotate};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::{FilterFn, Targets};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::{LoggingConfig, Section};

/// Section key treated as the catch-all for unmatched targets.
const DEFAULT_SECTION: &str = "default";

const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// "off"/"none" disable the output; anything unrecognized falls back to info.
fn parse_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// True when `target` is `crate_name` itself or a module underneath it.
fn target_in_crate(target: &str, crate_name: &str) -> bool {
    match target.strip_prefix(crate_name) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

/// One rotating log file, shareable across layers.
#[derive(Clone)]
struct LogFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl LogFile {
    fn open(path: &Path, max_bytes: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Writer handed to a layer for one record; `None` swallows the output.
struct MaybeWriter(Option<LogFile>);

impl Write for MaybeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Picks the log file for a record: the owning subsystem's file when the
/// target falls under a configured crate, otherwise the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<LogFile>,
    subsystems: HashMap<String, LogFile>,
}

impl FileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = Self::default();
        for (name, section) in cfg {
            let Some(file) = open_section_file(name, section, base_dir) else {
                continue;
            };
            if name == DEFAULT_SECTION {
                router.default = Some(file);
            } else {
                router.subsystems.insert(name.clone(), file);
            }
        }
        router
    }

    fn has_files(&self) -> bool {
        self.default.is_some() || !self.subsystems.is_empty()
    }

    fn route(&self, target: &str) -> Option<LogFile> {
        self.subsystems
            .iter()
            .find(|(name, _)| target_in_crate(target, name))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeWriter(self.route(meta.target()))
    }
}

/// Resolve a log file path against `base_dir` (normally `server.home_dir`).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Open a section's rotating file, if one is configured. Failure to open is
/// reported on stderr and the section simply loses its file output; logging
/// setup never aborts startup.
fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<LogFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let path = resolve_log_path(&section.file, base_dir);
    match LogFile::open(&path, max_bytes as usize) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "Failed to open log file for '{}': {} ({e})",
                name,
                path.display()
            );
            None
        }
    }
}

/// Per-crate level targets for the explicit sections. Everything not named
/// stays off; the catch-all layers pick those up.
fn explicit_targets<'a>(
    sections: impl Iterator<Item = (&'a String, &'a Section)>,
    level_of: impl Fn(&Section) -> &str,
) -> Targets {
    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (name, section) in sections {
        if let Some(level) = parse_level(level_of(section)) {
            targets = targets.with_target(name.clone(), LevelFilter::from_level(level));
        }
    }
    targets
}

type UnmatchedFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync>>;

/// Passes records that belong to none of the named crates, up to `max_level`.
fn unmatched_filter(crate_names: Vec<String>, max_level: Level) -> UnmatchedFilter {
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        crate_names
            .iter()
            .all(|name| !target_in_crate(meta.target(), name))
            && meta.level() <= &max_level
    }))
}

/// Initialize logging from the config's `logging` section; relative file
/// paths resolve under `base_dir`.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` -> `tracing` before the subscriber goes in.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let explicit = || cfg.iter().filter(|(name, _)| name.as_str() != DEFAULT_SECTION);
    let crate_names: Vec<String> = explicit().map(|(name, _)| name.clone()).collect();
    let default_section = cfg.get(DEFAULT_SECTION);
    let router = FileRouter::from_config(cfg, base_dir);
    let ansi = atty::is(atty::Stream::Stdout);

    // Explicit sections: console with each crate's own level, and JSON files
    // routed per subsystem. A section with a file_level but no file of its
    // own falls through to the default file.
    let console_explicit = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(explicit_targets(explicit(), |s| &s.console_level));

    let file_explicit = router.has_files().then(|| {
        let named_files = explicit().filter(|(_, s)| !s.file.trim().is_empty());
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router.clone())
            .with_filter(explicit_targets(named_files, |s| &s.file_level))
    });

    // Catch-all: whatever no explicit section claims, at the default levels.
    let console_default = default_section
        .and_then(|s| parse_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(unmatched_filter(crate_names.clone(), level))
        });

    let file_default = default_section
        .filter(|_| router.default.is_some())
        .and_then(|s| parse_level(&s.file_level))
        .map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router)
                .with_filter(unmatched_filter(crate_names, level))
        });

    let _ = Registry::default()
        .with(console_explicit)
        .with(file_explicit)
        .with(console_default)
        .with(file_default)
        .try_init();
}

/// Plain console logging; used when no logging section is configured.
pub fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}
