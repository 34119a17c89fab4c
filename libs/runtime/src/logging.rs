//! `tracing` subscriber built from the `logging:` config section.
//!
//! Each section is keyed by a target prefix (`rentals`, `api_ingress`, ...)
//! and has its own console level and optional JSON log file; `default`
//! covers every other target. Files rotate by size through `file-rotate`.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, Layer, Registry};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// Unknown names fall back to `info`; `off`/`none`/empty disable the sink.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" | "" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn matches_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/* ---------- rotating file sink ---------- */

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotatingFile {
    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
        let rot = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::MaxFiles(backups)),
            ContentLimit::BytesSurpassed(usize::try_from(max_bytes).unwrap_or(usize::MAX)),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rot))))
    }

    fn lock(&self) -> MutexGuard<'_, FileRotate<AppendTimestamp>> {
        // a panic mid-write leaves the file usable
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Writer for one event; `None` drops the bytes.
struct FileHandle(Option<RotatingFile>);

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(f) => f.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(f) => f.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the file of the longest section prefix matching an event's target.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingFile>,
    by_prefix: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn route(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_prefix(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, f)| f.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileHandle(self.route(meta.target()))
    }
}

/* ---------- filters ---------- */

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::INFO, |s| parse_level(&s.console_level));
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.console_level))
        })
}

fn file_level(section: &Section) -> LevelFilter {
    if section.file.trim().is_empty() {
        LevelFilter::OFF
    } else {
        parse_level(&section.file_level)
    }
}

fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg.get(DEFAULT_SECTION).map_or(LevelFilter::OFF, file_level);
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), file_level(s))
        })
}

fn open_files(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    // sections naming the same path share one writer
    let mut opened: HashMap<PathBuf, RotatingFile> = HashMap::new();
    let mut router = FileRouter::default();

    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        let path = resolve_log_path(&section.file, base_dir);
        let file = match opened.get(&path) {
            Some(f) => f.clone(),
            None => match RotatingFile::open(&path, section) {
                Ok(f) => {
                    opened.insert(path.clone(), f.clone());
                    f
                }
                Err(e) => {
                    eprintln!("cannot open log file {} for '{name}': {e}", path.display());
                    continue;
                }
            },
        };
        if name == DEFAULT_SECTION {
            router.default = Some(file);
        } else {
            router.by_prefix.push((name.clone(), file));
        }
    }
    router
}

/* ---------- public init ---------- */

/// Install the global subscriber. Relative log files resolve against
/// `base_dir` (normally `server.home_dir`). Safe to call more than once;
/// later calls are ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // bridge `log` records (sqlx, hyper) before the subscriber exists
    let _ = tracing_log::LogTracer::init();

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg))
        .boxed();

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![console];

    let files = open_files(cfg, base_dir);
    if !files.is_empty() {
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_current_span(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(files)
                .with_filter(file_targets(cfg))
                .boxed(),
        );
    }

    let subscriber = Registry::default().with(layers);
    let _ = tracing::subscriber::set_global_default(subscriber);
}
