/* src/adapters/log.rs */

//! Structured JSON logger with live level and output changes.
//!
//! Any config change is absorbed in place: the level is swapped and, if the
//! output moved, the new output is opened before the old one is released.

use std::convert::Infallible;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{Level, warn};
use tracing::level_filters::LevelFilter;

use crate::BoxError;
use crate::holder::{Container, Decision, HoldError, Resource};
use crate::loader::Schema;

const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
	#[error("parse level {level:?}: {reason}")]
	Level { level: String, reason: String },

	#[error("open log file {path}: {source}")]
	Output {
		path: String,
		#[source]
		source: io::Error,
	},

	#[error("write log record: {0}")]
	Write(#[from] io::Error),

	#[error("encode log record: {0}")]
	Encode(#[from] serde_json::Error),
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggerConfig {
	/// `trace`, `debug`, `info`, `warn`, `error` or `off`.
	pub level: String,
	/// `stdout`, `stderr`, or a file path opened in append mode.
	pub output: String,
}

impl LoggerConfig {
	/// Schema reading `<PREFIX>_LOG_LEVEL` and `<PREFIX>_LOG_OUTPUT`.
	pub fn schema(prefix: &str) -> Schema<Self> {
		Schema::new()
			.required(format!("{prefix}_LOG_LEVEL"), |c: &mut Self, v| c.level = v)
			.required(format!("{prefix}_LOG_OUTPUT"), |c: &mut Self, v| c.output = v)
	}
}

#[derive(Debug)]
enum Output {
	Stdout,
	Stderr,
	File(File),
	Closed,
}

impl Output {
	fn open(target: &str) -> Result<Self, LogError> {
		if target.eq_ignore_ascii_case("stdout") {
			return Ok(Self::Stdout);
		}
		if target.eq_ignore_ascii_case("stderr") {
			return Ok(Self::Stderr);
		}
		OpenOptions::new()
			.create(true)
			.append(true)
			.open(target)
			.map(Self::File)
			.map_err(|source| LogError::Output {
				path: target.to_string(),
				source,
			})
	}

	fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
		match self {
			Self::Stdout => io::stdout().lock().write_all(line),
			Self::Stderr => io::stderr().lock().write_all(line),
			Self::File(file) => file.write_all(line),
			Self::Closed => Ok(()),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self {
			Self::Stdout => io::stdout().flush(),
			Self::Stderr => io::stderr().flush(),
			Self::File(file) => file.flush(),
			Self::Closed => Ok(()),
		}
	}
}

#[derive(Serialize)]
struct Record<'a> {
	time: String,
	level: &'static str,
	msg: &'a str,
	#[serde(flatten)]
	fields: Option<&'a Map<String, Value>>,
}

fn parse_level(level: &str) -> Result<LevelFilter, LogError> {
	level.trim().parse().map_err(|e| LogError::Level {
		level: level.to_string(),
		reason: format!("{e}"),
	})
}

fn level_name(level: Level) -> &'static str {
	match level {
		Level::TRACE => "trace",
		Level::DEBUG => "debug",
		Level::INFO => "info",
		Level::WARN => "warn",
		Level::ERROR => "error",
	}
}

/// A JSON-lines logger.
#[derive(Debug)]
pub struct Logger {
	level: RwLock<LevelFilter>,
	output: Mutex<Output>,
}

impl Logger {
	pub fn new(config: &LoggerConfig) -> Result<Self, LogError> {
		let level = parse_level(&config.level)?;
		let output = Output::open(&config.output)?;
		Ok(Self {
			level: RwLock::new(level),
			output: Mutex::new(output),
		})
	}

	pub fn level(&self) -> LevelFilter {
		*self.level.read()
	}

	pub fn set_level(&self, level: &str) -> Result<(), LogError> {
		*self.level.write() = parse_level(level)?;
		Ok(())
	}

	/// Opens `output` and switches to it; the previous file, if any, is closed.
	pub fn set_output(&self, output: &str) -> Result<(), LogError> {
		self.swap_output(Output::open(output)?);
		Ok(())
	}

	fn swap_output(&self, next: Output) {
		let mut prev = std::mem::replace(&mut *self.output.lock(), next);
		if let Err(e) = prev.flush() {
			warn!(error = %e, "failed to flush previous log output");
		}
	}

	pub fn enabled(&self, level: Level) -> bool {
		level <= self.level()
	}

	/// Writes one record if `level` passes the current filter. `fields` is
	/// merged into the record when it is a JSON object.
	pub fn log(&self, level: Level, msg: &str, fields: &Value) -> Result<(), LogError> {
		self.write(level, level_name(level), msg, fields)
	}

	fn write(&self, level: Level, label: &'static str, msg: &str, fields: &Value) -> Result<(), LogError> {
		if !self.enabled(level) {
			return Ok(());
		}

		let record = Record {
			time: chrono::Local::now().format(TIME_LAYOUT).to_string(),
			level: label,
			msg,
			fields: fields.as_object(),
		};
		let mut line = serde_json::to_vec(&record)?;
		line.push(b'\n');

		self.output.lock().write_line(&line)?;
		Ok(())
	}
}

impl Resource for Logger {
	type Error = LogError;

	fn close(&self) -> Result<(), LogError> {
		let mut output = self.output.lock();
		output.flush()?;
		*output = Output::Closed;
		Ok(())
	}
}

/// Any difference is absorbed by [`reset`].
pub fn compare(old: &LoggerConfig, new: &LoggerConfig) -> Result<Decision, Infallible> {
	Ok(if old == new {
		Decision::NoNeed
	} else {
		Decision::NeedReset
	})
}

pub fn construct(config: &LoggerConfig) -> Result<Logger, LogError> {
	Logger::new(config)
}

/// Applies level and output changes to a live logger.
///
/// Both changes are prepared before either is applied, so a failure leaves
/// the logger exactly as it was.
pub fn reset(logger: &Logger, old: &LoggerConfig, new: &LoggerConfig) -> Result<(), LogError> {
	let level = (old.level != new.level)
		.then(|| parse_level(&new.level))
		.transpose()?;
	let output = (old.output != new.output)
		.then(|| Output::open(&new.output))
		.transpose()?;

	if let Some(level) = level {
		*logger.level.write() = level;
	}
	if let Some(output) = output {
		logger.swap_output(output);
	}
	Ok(())
}

/// Builds a logger container around `fetch`.
pub fn logger_container<F, E>(
	name: impl Into<String>,
	fetch: F,
) -> Result<Container<Logger, LoggerConfig>, HoldError>
where
	F: Fn() -> Result<LoggerConfig, E> + Send + Sync + 'static,
	E: Into<BoxError>,
{
	Container::builder()
		.name(name)
		.fetch(fetch)
		.compare(compare)
		.construct(construct)
		.reset(reset)
		.build()
}

impl Container<Logger, LoggerConfig> {
	/// Checks out the current logger, writes one record, and returns it.
	///
	/// Write failures are reported through `tracing` and otherwise dropped.
	pub fn log(&self, level: Level, msg: &str, fields: Value) {
		self.write(level, level_name(level), msg, &fields);
	}

	fn write(&self, level: Level, label: &'static str, msg: &str, fields: &Value) {
		let logger = self.checkout();
		if let Err(e) = logger.write(level, label, msg, fields) {
			warn!(container = %self.name(), error = %e, "failed to write log record");
		}
	}

	pub fn trace(&self, msg: &str, fields: Value) {
		self.log(Level::TRACE, msg, fields);
	}

	pub fn debug(&self, msg: &str, fields: Value) {
		self.log(Level::DEBUG, msg, fields);
	}

	pub fn info(&self, msg: &str, fields: Value) {
		self.log(Level::INFO, msg, fields);
	}

	pub fn warn(&self, msg: &str, fields: Value) {
		self.log(Level::WARN, msg, fields);
	}

	pub fn error(&self, msg: &str, fields: Value) {
		self.log(Level::ERROR, msg, fields);
	}

	/// Writes a `fatal` record at error severity, then exits with status 1.
	///
	/// No teardown runs; prefer `Shutdown::exit_err` where a shutdown chain
	/// exists.
	pub fn fatal(&self, msg: &str, fields: Value) -> ! {
		self.write(Level::ERROR, "fatal", msg, &fields);
		std::process::exit(1)
	}

	/// Writes a `panic` record at error severity, then panics with `msg`.
	pub fn panic(&self, msg: &str, fields: Value) -> ! {
		self.write(Level::ERROR, "panic", msg, &fields);
		panic!("{msg}")
	}
}
