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

use std::{sync::Arc, time::Duration};

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, header};
use thiserror::Error;
use tracing::debug;

use crate::credentials::{CredentialProvider, Session};
use crate::types::{Snippet, SnippetDraft, SnippetPatch};
use crate::wire::{CreateBody, GistPayload, UpdateBody};

/// Public GitHub API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent when none is configured (the API rejects requests without one)
pub const DEFAULT_USER_AGENT: &str = concat!("gistdeck/", env!("CARGO_PKG_VERSION"));

const ACCEPT: &str = "application/vnd.github+json";

/// Error types for remote operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
	#[error("Unauthorized")]
	Unauthorized,
	#[error("Snippet not found: {0}")]
	NotFound(String),
	#[error("Request failed: {0}")]
	RequestFailed(String),
}

/// How a non-success status is classified for a given operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusPolicy {
	/// 401 is `Unauthorized`, everything else `RequestFailed`
	Write,
	/// 401 is `Unauthorized`, 404 is `NotFound`
	Read,
	/// Every non-success status is `RequestFailed`
	Plain,
}

fn classify(status: StatusCode, id: &str, policy: StatusPolicy, detail: String) -> RemoteError {
	match (status, policy) {
		(StatusCode::UNAUTHORIZED, StatusPolicy::Write | StatusPolicy::Read) => {
			RemoteError::Unauthorized
		}
		(StatusCode::NOT_FOUND, StatusPolicy::Read) => RemoteError::NotFound(id.to_string()),
		_ => RemoteError::RequestFailed(format!("{}: {}", status, detail)),
	}
}

fn transport_error(e: reqwest::Error) -> RemoteError {
	if e.is_timeout() {
		RemoteError::RequestFailed(format!("Request timed out: {}", e))
	} else {
		RemoteError::RequestFailed(format!("Request failed: {}", e))
	}
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
	pub base_url: String,
	pub timeout: Duration,
	pub user_agent: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_API_BASE_URL.to_string(),
			timeout: DEFAULT_TIMEOUT,
			user_agent: DEFAULT_USER_AGENT.to_string(),
		}
	}
}

/// Client for the remote snippet-hosting API
///
/// Translates snippet operations into REST calls and normalizes the
/// responses into [`Snippet`]. It performs no local bookkeeping; callers
/// reconcile their own state after a call succeeds.
pub struct Client {
	base_url: String,
	client: ReqwestClient,
	credentials: Arc<dyn CredentialProvider>,
}

impl Client {
	/// Create a client against `base_url` with default settings
	pub fn new(
		base_url: impl Into<String>,
		credentials: Arc<dyn CredentialProvider>,
	) -> Result<Self, RemoteError> {
		Self::with_config(
			ClientConfig {
				base_url: base_url.into(),
				..ClientConfig::default()
			},
			credentials,
		)
	}

	/// Create a client with custom configuration
	pub fn with_config(
		config: ClientConfig,
		credentials: Arc<dyn CredentialProvider>,
	) -> Result<Self, RemoteError> {
		let client = ReqwestClient::builder()
			.timeout(config.timeout)
			.user_agent(config.user_agent)
			.build()
			.map_err(|e| RemoteError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: config.base_url.trim_end_matches('/').to_string(),
			client,
			credentials,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Current session, as reported by the injected provider
	pub fn session(&self) -> Option<Session> {
		self.credentials.session()
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let url = format!("{}{}", self.base_url, path);
		debug!(target: "remote", %method, %url, "Sending request");
		let builder = self
			.client
			.request(method, url)
			.header(header::ACCEPT, ACCEPT);
		match self.credentials.session() {
			Some(session) => builder.bearer_auth(session.token),
			None => builder,
		}
	}

	fn require_session(&self) -> Result<Session, RemoteError> {
		self.credentials.session().ok_or(RemoteError::Unauthorized)
	}

	async fn send(
		&self,
		builder: RequestBuilder,
		id: &str,
		policy: StatusPolicy,
	) -> Result<Response, RemoteError> {
		let response = builder.send().await.map_err(transport_error)?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let detail = response
			.text()
			.await
			.unwrap_or_else(|_| format!("HTTP {}", status));
		debug!(target: "remote", %status, id, "Remote call rejected");
		Err(classify(status, id, policy, detail))
	}

	async fn decode(response: Response) -> Result<Snippet, RemoteError> {
		let payload: GistPayload = response.json().await.map_err(|e| {
			RemoteError::RequestFailed(format!("Failed to parse response: {}", e))
		})?;
		payload
			.into_snippet()
			.map_err(|e| RemoteError::RequestFailed(format!("Malformed snippet: {}", e)))
	}

	async fn decode_list(response: Response) -> Result<Vec<Snippet>, RemoteError> {
		let payloads: Vec<GistPayload> = response.json().await.map_err(|e| {
			RemoteError::RequestFailed(format!("Failed to parse response: {}", e))
		})?;
		payloads
			.into_iter()
			.map(|p| {
				p.into_snippet()
					.map_err(|e| RemoteError::RequestFailed(format!("Malformed snippet: {}", e)))
			})
			.collect()
	}

	/// Create a snippet
	///
	/// The snippet is stored as a single file named from the title. The
	/// returned value carries the draft's own fields, since the remote may
	/// rename or omit them.
	pub async fn create(&self, draft: &SnippetDraft) -> Result<Snippet, RemoteError> {
		self.require_session()?;
		let body = CreateBody::from_draft(draft);
		let response = self
			.send(
				self.request(Method::POST, "/gists").json(&body),
				"",
				StatusPolicy::Write,
			)
			.await?;

		let mut snippet = Self::decode(response).await?;
		snippet.title = draft.file_name();
		snippet.description = draft.description.clone();
		snippet.code = draft.code.clone();
		snippet.language = draft.language.clone();
		snippet.is_public = draft.is_public;
		snippet.star_count = 0;
		snippet.is_starred = false;
		Ok(snippet)
	}

	/// Fetch one snippet by id, including its full content
	pub async fn read(&self, id: &str) -> Result<Snippet, RemoteError> {
		let response = self
			.send(
				self.request(Method::GET, &format!("/gists/{}", id)),
				id,
				StatusPolicy::Read,
			)
			.await?;
		Self::decode(response).await
	}

	/// Apply description/content changes to an existing snippet
	pub async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, RemoteError> {
		self.require_session()?;
		let body = UpdateBody::from_patch(patch);
		let response = self
			.send(
				self.request(Method::PATCH, &format!("/gists/{}", id))
					.json(&body),
				id,
				StatusPolicy::Write,
			)
			.await?;
		Self::decode(response).await
	}

	/// Delete a snippet
	pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
		self.require_session()?;
		self.send(
			self.request(Method::DELETE, &format!("/gists/{}", id)),
			id,
			StatusPolicy::Plain,
		)
		.await?;
		Ok(())
	}

	/// Star (`true`) or unstar (`false`) a snippet; idempotent on the remote side
	pub async fn set_star(&self, id: &str, starred: bool) -> Result<(), RemoteError> {
		self.require_session()?;
		let method = if starred { Method::PUT } else { Method::DELETE };
		self.send(
			self.request(method, &format!("/gists/{}/star", id))
				.header(header::CONTENT_LENGTH, 0),
			id,
			StatusPolicy::Plain,
		)
		.await?;
		Ok(())
	}

	/// Whether the current session has starred a snippet
	pub async fn is_starred(&self, id: &str) -> Result<bool, RemoteError> {
		self.require_session()?;
		let response = self
			.request(Method::GET, &format!("/gists/{}/star", id))
			.send()
			.await
			.map_err(transport_error)?;

		match response.status() {
			StatusCode::NOT_FOUND => Ok(false),
			status if status.is_success() => Ok(true),
			status => {
				let detail = response
					.text()
					.await
					.unwrap_or_else(|_| format!("HTTP {}", status));
				Err(classify(status, id, StatusPolicy::Plain, detail))
			}
		}
	}

	/// List public snippets, in the order the remote returns them
	pub async fn list_public(&self) -> Result<Vec<Snippet>, RemoteError> {
		let response = self
			.send(
				self.request(Method::GET, "/gists/public"),
				"",
				StatusPolicy::Write,
			)
			.await?;
		Self::decode_list(response).await
	}

	/// List the snippets owned by `login`
	pub async fn list_user(&self, login: &str) -> Result<Vec<Snippet>, RemoteError> {
		let response = self
			.send(
				self.request(Method::GET, &format!("/users/{}/gists", login)),
				"",
				StatusPolicy::Write,
			)
			.await?;
		Self::decode_list(response).await
	}
}
