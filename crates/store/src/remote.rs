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

//! Seam between the store and the remote snippet-hosting API
//!
//! The store only talks to the remote through [`SnippetRemote`], so it can be
//! driven by the SDK client in production and by an in-memory fake in tests.

use async_trait::async_trait;
use gistdeck_sdk::{Client, RemoteError, Session, Snippet, SnippetDraft, SnippetPatch};

#[async_trait]
pub trait SnippetRemote: Send + Sync {
	/// Current session; `None` means nobody is signed in
	fn session(&self) -> Option<Session>;

	async fn list_public(&self) -> Result<Vec<Snippet>, RemoteError>;

	async fn list_user(&self, login: &str) -> Result<Vec<Snippet>, RemoteError>;

	async fn create(&self, draft: &SnippetDraft) -> Result<Snippet, RemoteError>;

	async fn read(&self, id: &str) -> Result<Snippet, RemoteError>;

	async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, RemoteError>;

	async fn delete(&self, id: &str) -> Result<(), RemoteError>;

	async fn set_star(&self, id: &str, starred: bool) -> Result<(), RemoteError>;

	async fn is_starred(&self, id: &str) -> Result<bool, RemoteError>;
}

#[async_trait]
impl SnippetRemote for Client {
	fn session(&self) -> Option<Session> {
		Client::session(self)
	}

	async fn list_public(&self) -> Result<Vec<Snippet>, RemoteError> {
		Client::list_public(self).await
	}

	async fn list_user(&self, login: &str) -> Result<Vec<Snippet>, RemoteError> {
		Client::list_user(self, login).await
	}

	async fn create(&self, draft: &SnippetDraft) -> Result<Snippet, RemoteError> {
		Client::create(self, draft).await
	}

	async fn read(&self, id: &str) -> Result<Snippet, RemoteError> {
		Client::read(self, id).await
	}

	async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, RemoteError> {
		Client::update(self, id, patch).await
	}

	async fn delete(&self, id: &str) -> Result<(), RemoteError> {
		Client::delete(self, id).await
	}

	async fn set_star(&self, id: &str, starred: bool) -> Result<(), RemoteError> {
		Client::set_star(self, id, starred).await
	}

	async fn is_starred(&self, id: &str) -> Result<bool, RemoteError> {
		Client::is_starred(self, id).await
	}
}
