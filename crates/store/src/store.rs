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

//! Snippet state store
//!
//! The store is the single source of truth for the snippets the current
//! session knows about. Every mutation follows the same shape:
//!
//! 1. raise the loading flag (released on every exit path)
//! 2. check the session before any network call
//! 3. call the remote
//! 4. reconcile the local collection only if the call succeeded
//!
//! Mutations are serialized per store, and the collection lock is never
//! held across an await point.

use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gistdeck_sdk::{Session, Snippet, SnippetDraft, SnippetPatch};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, info, warn};

use crate::{SnippetRemote, StoreError, query::SnippetQuery};

/// Keeps the loading flag raised while at least one operation is in flight
struct LoadingGuard<'a> {
	in_flight: &'a Mutex<usize>,
	loading: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
	fn enter(in_flight: &'a Mutex<usize>, loading: &'a watch::Sender<bool>) -> Self {
		let mut count = in_flight.lock().unwrap_or_else(|e| e.into_inner());
		*count += 1;
		if *count == 1 {
			loading.send_replace(true);
		}
		Self { in_flight, loading }
	}
}

impl Drop for LoadingGuard<'_> {
	fn drop(&mut self) {
		let mut count = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
		*count = count.saturating_sub(1);
		if *count == 0 {
			self.loading.send_replace(false);
		}
	}
}

/// Drop repeated ids, keeping the first occurrence
fn dedupe(snippets: Vec<Snippet>) -> Vec<Snippet> {
	let mut seen = std::collections::HashSet::new();
	snippets
		.into_iter()
		.filter(|s| seen.insert(s.id.clone()))
		.collect()
}

pub struct SnippetStore<R> {
	remote: R,
	/// Newest-created first
	snippets: RwLock<Vec<Snippet>>,
	/// Serializes remote mutations and their reconciliation
	mutation: AsyncMutex<()>,
	in_flight: Mutex<usize>,
	loading: watch::Sender<bool>,
}

impl<R: SnippetRemote> SnippetStore<R> {
	pub fn new(remote: R) -> Self {
		let (loading, _) = watch::channel(false);
		Self {
			remote,
			snippets: RwLock::new(Vec::new()),
			mutation: AsyncMutex::new(()),
			in_flight: Mutex::new(0),
			loading,
		}
	}

	pub fn remote(&self) -> &R {
		&self.remote
	}

	fn read_snippets(&self) -> RwLockReadGuard<'_, Vec<Snippet>> {
		self.snippets.read().unwrap_or_else(|e| e.into_inner())
	}

	fn write_snippets(&self) -> RwLockWriteGuard<'_, Vec<Snippet>> {
		self.snippets.write().unwrap_or_else(|e| e.into_inner())
	}

	fn begin(&self) -> LoadingGuard<'_> {
		LoadingGuard::enter(&self.in_flight, &self.loading)
	}

	fn require_session(&self) -> Result<Session, StoreError> {
		self.remote.session().ok_or(StoreError::Unauthenticated)
	}

	/// Whether any operation is currently in flight
	pub fn is_loading(&self) -> bool {
		*self.loading.borrow()
	}

	/// Receiver notified whenever the loading flag changes
	pub fn loading_updates(&self) -> watch::Receiver<bool> {
		self.loading.subscribe()
	}

	/// Snapshot of the collection
	pub fn snippets(&self) -> Vec<Snippet> {
		self.read_snippets().clone()
	}

	pub fn len(&self) -> usize {
		self.read_snippets().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read_snippets().is_empty()
	}

	/// Local lookup by id
	pub fn find(&self, id: &str) -> Option<Snippet> {
		self.read_snippets().iter().find(|s| s.id == id).cloned()
	}

	/// Filtered and sorted view of the current snapshot
	pub fn view(&self, query: &SnippetQuery) -> Vec<Snippet> {
		query.apply(&self.read_snippets())
	}

	fn replace_all(&self, snippets: Vec<Snippet>) {
		let snippets = dedupe(snippets);
		let count = snippets.len();
		*self.write_snippets() = snippets;
		info!(target: "store", count, "Collection replaced");
	}

	/// Replace the collection with the public snippets
	///
	/// The remote order is kept as-is; views apply their own ordering.
	pub async fn load_public(&self) -> Result<(), StoreError> {
		let _loading = self.begin();
		let _serial = self.mutation.lock().await;

		match self.remote.list_public().await {
			Ok(snippets) => {
				self.replace_all(snippets);
				Ok(())
			}
			Err(e) => {
				warn!(target: "store", error = %e, "Failed to load public snippets");
				Err(e.into())
			}
		}
	}

	/// Replace the collection with the snippets owned by `login`
	pub async fn load_user(&self, login: &str) -> Result<(), StoreError> {
		let _loading = self.begin();
		self.load_user_locked(login).await
	}

	/// Replace the collection with the signed-in user's snippets
	pub async fn load_mine(&self) -> Result<(), StoreError> {
		let _loading = self.begin();
		let session = self.require_session()?;
		self.load_user_locked(&session.login).await
	}

	/// Load `login`'s snippets, or the public ones without a login
	///
	/// A login other than the session's is listed without needing a session.
	pub async fn load_listing(&self, login: Option<&str>) -> Result<(), StoreError> {
		match login {
			None => self.load_public().await,
			Some(login) if self.remote.session().is_some_and(|s| s.login == login) => {
				self.load_mine().await
			}
			Some(login) => self.load_user(login).await,
		}
	}

	/// Listing body shared by `load_user` and `load_mine`; the caller holds
	/// the loading guard
	async fn load_user_locked(&self, login: &str) -> Result<(), StoreError> {
		let _serial = self.mutation.lock().await;

		match self.remote.list_user(login).await {
			Ok(snippets) => {
				self.replace_all(snippets);
				Ok(())
			}
			Err(e) => {
				warn!(target: "store", login, error = %e, "Failed to load user snippets");
				Err(e.into())
			}
		}
	}

	/// Create a snippet and put it at the front of the collection
	pub async fn create(&self, draft: SnippetDraft) -> Result<Snippet, StoreError> {
		let _loading = self.begin();
		self.require_session()?;
		let _serial = self.mutation.lock().await;

		let snippet = self.remote.create(&draft).await.map_err(|e| {
			warn!(target: "store", error = %e, "Failed to create snippet");
			StoreError::from(e)
		})?;

		{
			let mut snippets = self.write_snippets();
			snippets.retain(|s| s.id != snippet.id);
			snippets.insert(0, snippet.clone());
		}
		info!(target: "store", id = %snippet.id, title = %snippet.title, "Snippet created");
		Ok(snippet)
	}

	/// Update a snippet and replace the local entry with the remote result
	///
	/// Without an explicit title, the local entry's title names the file the
	/// new content is written to. An empty patch changes nothing and returns
	/// the local entry without a remote call.
	pub async fn update(&self, id: &str, mut patch: SnippetPatch) -> Result<Snippet, StoreError> {
		let _loading = self.begin();
		self.require_session()?;
		let _serial = self.mutation.lock().await;

		if patch.is_empty() {
			debug!(target: "store", id, "Empty patch, nothing to send");
			return self
				.find(id)
				.ok_or_else(|| StoreError::NotFound(id.to_string()));
		}

		if patch.title.is_none() {
			patch.title = self.find(id).map(|s| s.title);
		}

		let updated = self.remote.update(id, &patch).await.map_err(|e| {
			warn!(target: "store", id, error = %e, "Failed to update snippet");
			StoreError::from(e)
		})?;

		{
			let mut snippets = self.write_snippets();
			if let Some(entry) = snippets.iter_mut().find(|s| s.id == id) {
				*entry = updated.clone();
			}
		}
		info!(target: "store", id, "Snippet updated");
		Ok(updated)
	}

	/// Delete a snippet and drop it from the collection
	pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
		let _loading = self.begin();
		self.require_session()?;
		let _serial = self.mutation.lock().await;

		self.remote.delete(id).await.map_err(|e| {
			warn!(target: "store", id, error = %e, "Failed to delete snippet");
			StoreError::from(e)
		})?;

		self.write_snippets().retain(|s| s.id != id);
		info!(target: "store", id, "Snippet deleted");
		Ok(())
	}

	/// Flip the session's star on a locally known snippet
	///
	/// On success the entry's `is_starred` flips and `star_count` moves by
	/// one. On failure the entry is untouched and the error is returned for
	/// the caller to report.
	pub async fn toggle_star(&self, id: &str) -> Result<Snippet, StoreError> {
		let _loading = self.begin();
		self.require_session()?;
		let _serial = self.mutation.lock().await;

		let current = self
			.find(id)
			.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
		let starred = !current.is_starred;

		if let Err(e) = self.remote.set_star(id, starred).await {
			warn!(target: "store", id, starred, error = %e, "Failed to update star status");
			return Err(e.into());
		}

		let mut snippets = self.write_snippets();
		let entry = snippets
			.iter_mut()
			.find(|s| s.id == id)
			.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
		entry.is_starred = starred;
		entry.star_count = if starred {
			entry.star_count + 1
		} else {
			entry.star_count.saturating_sub(1)
		};
		debug!(target: "store", id, starred, star_count = entry.star_count, "Star reconciled");
		Ok(entry.clone())
	}

	/// Re-read the session's star on a locally known snippet
	///
	/// Only `is_starred` is reconciled; the remote does not report counts.
	pub async fn refresh_star(&self, id: &str) -> Result<bool, StoreError> {
		let _loading = self.begin();
		self.require_session()?;
		let _serial = self.mutation.lock().await;

		if self.find(id).is_none() {
			return Err(StoreError::NotFound(id.to_string()));
		}

		let starred = self.remote.is_starred(id).await.map_err(|e| {
			warn!(target: "store", id, error = %e, "Failed to read star status");
			StoreError::from(e)
		})?;

		if let Some(entry) = self.write_snippets().iter_mut().find(|s| s.id == id) {
			entry.is_starred = starred;
		}
		Ok(starred)
	}

	/// Fetch a snippet with its full content
	///
	/// Always goes to the remote: listed entries carry no code. The
	/// collection is not touched.
	pub async fn get_by_id(&self, id: &str) -> Result<Snippet, StoreError> {
		let _loading = self.begin();
		self.remote.read(id).await.map_err(|e| {
			warn!(target: "store", id, error = %e, "Failed to fetch snippet");
			StoreError::from(e)
		})
	}
}
