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

//! Gistdeck command
//!
//! Loads the configured snippet collection into a store and prints the
//! configured view. Everything is driven by `GISTDECK_*` environment
//! variables (see `config`).

use std::sync::Arc;

use anyhow::{Context, Result};
use gistdeck_sdk::{AnonymousCredentials, Client, CredentialProvider, StaticCredentials};
use gistdeck_store::{SnippetStore, config::StoreConfig, group_languages, logging::init_logging};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = StoreConfig::from_env().context("Failed to load configuration")?;
	info!(target: "gistdeck", "Using remote {}", config.api_base_url);

	let credentials: Arc<dyn CredentialProvider> = match config.session() {
		Some(session) => Arc::new(StaticCredentials::new(session)),
		None => Arc::new(AnonymousCredentials),
	};
	let client = Client::with_config(config.client_config(), credentials)
		.context("Failed to create remote client")?;
	let store = SnippetStore::new(client);

	match &config.login {
		Some(login) => info!(target: "gistdeck", "Loading snippets for {}", login),
		None => info!(target: "gistdeck", "Loading public snippets"),
	}
	let loaded = store.load_listing(config.login.as_deref()).await;
	if let Err(e) = &loaded {
		if e.is_unauthorized() {
			warn!(target: "gistdeck", "Remote rejected the credentials; check GISTDECK_TOKEN");
		}
	}
	loaded.context("Failed to load snippets")?;

	let view = store.view(&config.view_query());
	info!(target: "gistdeck", "{} of {} snippets match", view.len(), store.len());

	for snippet in &view {
		println!(
			"{}\t{}\t{}\t{}\t{}",
			snippet.id,
			snippet.created_at.format("%Y-%m-%d"),
			snippet.star_count,
			snippet.language,
			snippet.title
		);
	}

	let languages: Vec<String> = group_languages(&store.snippets()).into_iter().collect();
	println!("languages: {}", languages.join(", "));

	Ok(())
}
