//! Named logging sinks built on `tracing-subscriber`.
//!
//! A [`LogRegistry`] hands out [`Logger`]s keyed by name. Each logger owns its
//! own [`Dispatch`] with a console layer and an optional file layer, each
//! filtered independently. Call sites log through the regular `tracing` macros
//! while the logger is in scope (or installed globally).

use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::dispatcher::DefaultGuard;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

use crate::utils::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

type ConsoleFactory = Arc<dyn Fn() -> BoxMakeWriter + Send + Sync>;

/// Minimum severities for the two output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub console: LevelFilter,
    pub file: LevelFilter,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            console: LevelFilter::INFO,
            file: LevelFilter::DEBUG,
        }
    }
}

/// An output target attached to a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Console { level: LevelFilter },
    File { path: PathBuf, level: LevelFilter },
}

/// Formats events as `[timestamp] LEVEL name:line - message`.
struct LineFormat {
    name: Arc<str>,
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "[{}] {} {}:{} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            level_name(meta.level()),
            self.name,
            meta.line().unwrap_or_default()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
    dispatch: Dispatch,
    targets: Vec<LogTarget>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &[LogTarget] {
        &self.targets
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Makes this logger the current thread's default until the guard drops.
    pub fn scoped(&self) -> DefaultGuard {
        tracing::dispatcher::set_default(&self.dispatch)
    }

    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Installs this logger as the process-wide default. Fails if one is already set.
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }
}

/// Explicit registry of named loggers.
///
/// Setting up a name that is already registered replaces its output targets,
/// so repeated initialization never duplicates output.
pub struct LogRegistry {
    console: ConsoleFactory,
    loggers: HashMap<String, Logger>,
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::with_console(std::io::stderr)
    }
}

impl fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRegistry")
            .field("loggers", &self.loggers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `make_writer` for the console target of every logger set up afterwards.
    pub fn with_console<W>(make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Clone + Send + Sync + 'static,
    {
        Self {
            console: Arc::new(move || BoxMakeWriter::new(make_writer.clone())),
            loggers: HashMap::new(),
        }
    }

    pub fn setup(&mut self, name: &str, logfile: Option<&Path>) -> Result<Logger> {
        self.setup_with(name, logfile, Thresholds::default())
    }

    pub fn setup_with(
        &mut self,
        name: &str,
        logfile: Option<&Path>,
        thresholds: Thresholds,
    ) -> Result<Logger> {
        // Old targets go first; the file handle closes when the last clone drops.
        self.loggers.remove(name);

        // An empty path means console only.
        let logfile = logfile.filter(|path| !path.as_os_str().is_empty());
        let file = logfile.map(open_log_file).transpose()?;
        let name: Arc<str> = Arc::from(name);

        let mut targets = vec![LogTarget::Console {
            level: thresholds.console,
        }];
        if let Some(path) = logfile {
            targets.push(LogTarget::File {
                path: path.to_path_buf(),
                level: thresholds.file,
            });
        }

        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .event_format(LineFormat { name: name.clone() })
            .with_writer((self.console)())
            .with_filter(thresholds.console);

        let file_layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(LineFormat { name: name.clone() })
                .with_writer(Mutex::new(file))
                .with_filter(thresholds.file)
        });

        let subscriber = Registry::default().with(console_layer).with(file_layer);

        let logger = Logger {
            name: name.clone(),
            dispatch: Dispatch::new(subscriber),
            targets,
        };
        self.loggers.insert(name.to_string(), logger.clone());
        Ok(logger)
    }

    pub fn get(&self, name: &str) -> Option<&Logger> {
        self.loggers.get(name)
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn registry_with_buffer() -> (LogRegistry, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        (LogRegistry::with_console(move || writer.clone()), buffer)
    }

    #[test]
    fn test_console_only_logger() {
        let (mut registry, console) = registry_with_buffer();
        let logger = registry.setup("rtr", None).unwrap();

        assert_eq!(
            logger.targets(),
            &[LogTarget::Console {
                level: LevelFilter::INFO
            }]
        );

        let line = logger.in_scope(|| {
            let line = line!() + 1;
            tracing::info!("scripts queued");
            tracing::debug!("not on console");
            line
        });

        let output = console.contents();
        assert!(output.contains(&format!("INFO rtr:{} - scripts queued", line)));
        assert!(!output.contains("not on console"));
        assert!(output.starts_with('['));
    }

    #[test]
    fn test_file_receives_debug() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("run.log");
        let (mut registry, console) = registry_with_buffer();

        let logger = registry.setup("rtr", Some(&log_path)).unwrap();
        logger.in_scope(|| {
            tracing::debug!("host batch prepared");
            tracing::warn!("retrying host");
        });

        let file_output = std::fs::read_to_string(&log_path).unwrap();
        assert!(file_output.contains("DEBUG rtr:"));
        assert!(file_output.contains("- host batch prepared"));
        assert!(file_output.contains("WARNING rtr:"));

        let console_output = console.contents();
        assert!(!console_output.contains("host batch prepared"));
        assert!(console_output.contains("retrying host"));
    }

    #[test]
    fn test_setup_twice_replaces_targets() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.log");
        let second = temp_dir.path().join("second.log");
        let (mut registry, console) = registry_with_buffer();

        registry.setup("rtr", Some(&first)).unwrap();
        let logger = registry.setup("rtr", Some(&second)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("rtr").unwrap().targets(),
            &[
                LogTarget::Console {
                    level: LevelFilter::INFO
                },
                LogTarget::File {
                    path: second.clone(),
                    level: LevelFilter::DEBUG
                },
            ]
        );

        logger.in_scope(|| tracing::info!("only once"));

        assert_eq!(console.contents().matches("only once").count(), 1);
        assert!(std::fs::read_to_string(&first).unwrap().is_empty());
        assert!(std::fs::read_to_string(&second)
            .unwrap()
            .contains("only once"));
    }

    #[test]
    fn test_setup_twice_can_drop_file_target() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.log");
        let (mut registry, _console) = registry_with_buffer();

        registry.setup("rtr", Some(&path)).unwrap();
        let logger = registry.setup("rtr", None).unwrap();

        assert_eq!(logger.targets().len(), 1);
        assert!(matches!(logger.targets()[0], LogTarget::Console { .. }));
    }

    #[test]
    fn test_custom_thresholds() {
        let (mut registry, console) = registry_with_buffer();
        let thresholds = Thresholds {
            console: LevelFilter::DEBUG,
            ..Thresholds::default()
        };
        let logger = registry.setup_with("verbose", None, thresholds).unwrap();

        logger.in_scope(|| tracing::debug!("visible now"));
        assert!(console.contents().contains("DEBUG verbose:"));
    }

    #[test]
    fn test_warning_level_name() {
        let (mut registry, console) = registry_with_buffer();
        let logger = registry.setup("rtr", None).unwrap();

        logger.in_scope(|| tracing::warn!(host = "h1", "retrying host"));

        let output = console.contents();
        assert!(output.contains("] WARNING rtr:"));
        assert!(output.contains("- retrying host"));
        assert!(output.contains("host=\"h1\""));
    }

    #[test]
    fn test_empty_log_path_is_console_only() {
        let (mut registry, _console) = registry_with_buffer();
        let logger = registry.setup("rtr", Some(Path::new(""))).unwrap();

        assert_eq!(
            logger.targets(),
            &[LogTarget::Console {
                level: LevelFilter::INFO
            }]
        );
    }

    #[test]
    fn test_scoped_guard() {
        let (mut registry, console) = registry_with_buffer();
        let logger = registry.setup("scoped", None).unwrap();

        {
            let _guard = logger.scoped();
            tracing::error!("upload failed");
        }
        tracing::error!("after guard");

        let output = console.contents();
        assert!(output.contains("ERROR scoped:"));
        assert!(!output.contains("after guard"));
    }

    #[test]
    fn test_missing_log_directory_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("run.log");
        let mut registry = LogRegistry::new();

        let err = registry.setup("rtr", Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            crate::utils::error::BootstrapError::Io(ref e) if e.kind() == io::ErrorKind::NotFound
        ));
    }
}
