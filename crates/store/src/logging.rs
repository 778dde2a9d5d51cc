// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging initialization for the gistdeck binary
//!
//! Environment variables:
//!
//! - `RUST_LOG`: log level filter (default: `info`), e.g.
//!   `RUST_LOG=gistdeck_store=debug,remote=debug`
//! - `LOG_DIR`: root directory for log files (default: `{workspace_root}/logs`).
//!   Files are written to `{LOG_DIR}/gistdeck/gistdeck.{date}.log`, rotated daily (UTC).
//! - `LOG_TO_CONSOLE`: `true`, `1` or `yes` also writes ANSI-colored output to stderr.

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Flushes buffered lines on exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Nearest ancestor of `start` whose Cargo.toml declares a workspace
fn find_workspace_root(start: &Path) -> Option<PathBuf> {
	start.ancestors().find_map(|dir| {
		let manifest = dir.join("Cargo.toml");
		std::fs::read_to_string(&manifest)
			.ok()
			.filter(|content| content.contains("[workspace]"))
			.map(|_| dir.to_path_buf())
	})
}

fn log_root() -> PathBuf {
	if let Ok(dir) = env::var("LOG_DIR") {
		return PathBuf::from(dir);
	}
	let start = env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.or_else(|_| env::current_dir())
		.unwrap_or_else(|_| PathBuf::from("."));
	find_workspace_root(&start)
		.unwrap_or(start)
		.join("logs")
}

fn console_enabled(value: Option<&str>) -> bool {
	value
		.map(|v| matches!(v, "true" | "1" | "yes"))
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE)
}

/// Initialize logging with daily-rolling file output and optional console output
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let log_dir = log_root().join(LOG_COMPONENT_NAME);
	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME)
		.filename_suffix("log")
		.build(&log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;
	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	let log_to_console = console_enabled(env::var("LOG_TO_CONSOLE").ok().as_deref());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let file_layer = fmt::layer()
		.with_writer(file_writer)
		.with_timer(fmt::time::UtcTime::rfc_3339())
		.with_thread_ids(true)
		.with_target(true)
		.with_ansi(false);

	let console_layer = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_target(true)
			.with_ansi(true)
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "gistdeck", "Log level: {}", log_level);
	info!(target: "gistdeck", "Log directory: {}", log_dir.display());
	if log_to_console {
		info!(target: "gistdeck", "Console output: enabled");
	}

	Ok(())
}
