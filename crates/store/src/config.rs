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

use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use gistdeck_sdk::{ClientConfig, Session, client};
use serde::{Deserialize, Serialize};

use crate::query::{SnippetQuery, SortMode};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "gistdeck";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Remote configuration constants
/// Environment variable prefix, e.g. `GISTDECK_API_BASE_URL`
pub const ENV_PREFIX: &str = "GISTDECK";

/// Default remote API root (can be overridden by GISTDECK_API_BASE_URL)
pub const DEFAULT_API_BASE_URL: &str = client::DEFAULT_API_BASE_URL;

/// Default per-request timeout in milliseconds (can be overridden by GISTDECK_REQUEST_TIMEOUT_MS)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

fn default_api_base_url() -> String {
	DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
	DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_user_agent() -> String {
	client::DEFAULT_USER_AGENT.to_string()
}

/// Store runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
	/// Remote API root
	#[serde(default = "default_api_base_url")]
	pub api_base_url: String,
	/// Per-request timeout
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
	/// Bearer token; a session exists only when this is set
	#[serde(default)]
	pub token: Option<String>,
	/// Login of the signed-in account
	#[serde(default)]
	pub login: Option<String>,
	/// Text search applied to the printed view
	#[serde(default)]
	pub query: String,
	/// Language filter applied to the printed view
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub sort: SortMode,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			api_base_url: default_api_base_url(),
			request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
			user_agent: default_user_agent(),
			token: None,
			login: None,
			query: String::new(),
			language: None,
			sort: SortMode::default(),
		}
	}
}

impl StoreConfig {
	/// Load configuration from environment variables (and `.env`)
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenv::dotenv().ok();
		Self::load(Config::builder().add_source(Environment::with_prefix(ENV_PREFIX)))
	}

	/// Load configuration from file, with environment overrides
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		dotenv::dotenv().ok();
		Self::load(
			Config::builder()
				.add_source(File::with_name(path))
				.add_source(Environment::with_prefix(ENV_PREFIX)),
		)
	}

	fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
		builder.build()?.try_deserialize()
	}

	pub fn client_config(&self) -> ClientConfig {
		ClientConfig {
			base_url: self.api_base_url.clone(),
			timeout: Duration::from_millis(self.request_timeout_ms),
			user_agent: self.user_agent.clone(),
		}
	}

	/// Session formed from the configured token, if any
	pub fn session(&self) -> Option<Session> {
		self.token
			.as_ref()
			.filter(|t| !t.is_empty())
			.map(|token| Session::new(self.login.clone().unwrap_or_default(), token.clone()))
	}

	pub fn view_query(&self) -> SnippetQuery {
		SnippetQuery {
			text: self.query.clone(),
			language: self.language.clone(),
			sort: self.sort,
		}
	}
}
