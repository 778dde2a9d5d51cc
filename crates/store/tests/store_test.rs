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

//! Integration tests for the snippet store
//!
//! These tests verify:
//! - Reconciliation after successful remote calls
//! - State is left untouched when the remote fails
//! - Session checks happen before any network call
//! - The loading flag is raised while a remote call is pending and released
//!   on every exit path
//! - Mutations reach the remote one at a time

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gistdeck_sdk::{Owner, RemoteError, Session, Snippet, SnippetDraft, SnippetPatch};
use gistdeck_store::{SnippetQuery, SnippetRemote, SnippetStore, SortMode, StoreError};
use tokio::sync::{Notify, watch};

/// In-memory stand-in for the hosting API
#[derive(Default)]
struct FakeRemote {
	session: Mutex<Option<Session>>,
	listing: Mutex<Vec<Snippet>>,
	next_error: Mutex<Option<RemoteError>>,
	starred: AtomicBool,
	calls: Mutex<Vec<String>>,
	next_id: Mutex<u32>,
	/// While set, `create` and `list_user` park until `release`
	gate: Mutex<Option<Arc<Notify>>>,
	/// Signalled each time a call parks on the gate
	parked: Notify,
	/// Loading flag as seen from inside the remote
	observer: Mutex<Option<watch::Receiver<bool>>>,
	/// Whether the flag moved between the session check and `list_user`
	loading_changed_at_listing: Mutex<Option<bool>>,
}

impl FakeRemote {
	fn signed_in() -> Self {
		let remote = Self::default();
		*remote.session.lock().unwrap() = Some(Session::new("octocat", "t0k3n"));
		remote
	}

	fn fail_next(&self, error: RemoteError) {
		*self.next_error.lock().unwrap() = Some(error);
	}

	fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	fn hold(&self) {
		*self.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
	}

	fn release(&self) {
		if let Some(gate) = self.gate.lock().unwrap().take() {
			gate.notify_one();
		}
	}

	async fn pass_gate(&self) {
		let gate = self.gate.lock().unwrap().clone();
		if let Some(gate) = gate {
			self.parked.notify_one();
			gate.notified().await;
		}
	}

	fn observe(&self, updates: watch::Receiver<bool>) {
		*self.observer.lock().unwrap() = Some(updates);
	}

	fn note_listing(&self) {
		if let Some(updates) = self.observer.lock().unwrap().as_ref() {
			let changed = updates.has_changed().unwrap_or(true);
			*self.loading_changed_at_listing.lock().unwrap() = Some(changed);
		}
	}

	fn record(&self, call: String) -> Result<(), RemoteError> {
		self.calls.lock().unwrap().push(call);
		match self.next_error.lock().unwrap().take() {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

fn create_test_snippet(id: &str, star_count: u64, is_starred: bool) -> Snippet {
	let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
	Snippet {
		id: id.to_string(),
		title: format!("{}.rs", id),
		description: Some(format!("snippet {}", id)),
		code: String::new(),
		language: "Rust".to_string(),
		is_public: true,
		owner: Owner {
			login: "octocat".to_string(),
			id: "1".to_string(),
			avatar_url: None,
		},
		created_at,
		updated_at: created_at,
		star_count,
		is_starred,
		comments: 0,
	}
}

#[async_trait]
impl SnippetRemote for FakeRemote {
	fn session(&self) -> Option<Session> {
		if let Some(updates) = self.observer.lock().unwrap().as_mut() {
			updates.borrow_and_update();
		}
		self.session.lock().unwrap().clone()
	}

	async fn list_public(&self) -> Result<Vec<Snippet>, RemoteError> {
		self.record("list_public".to_string())?;
		Ok(self.listing.lock().unwrap().clone())
	}

	async fn list_user(&self, login: &str) -> Result<Vec<Snippet>, RemoteError> {
		self.record(format!("list_user {}", login))?;
		self.note_listing();
		self.pass_gate().await;
		Ok(self
			.listing
			.lock()
			.unwrap()
			.iter()
			.filter(|s| s.owner.login == login)
			.cloned()
			.collect())
	}

	async fn create(&self, draft: &SnippetDraft) -> Result<Snippet, RemoteError> {
		self.record(format!("create {}", draft.title))?;
		self.pass_gate().await;
		let mut next_id = self.next_id.lock().unwrap();
		*next_id += 1;
		let mut snippet = create_test_snippet(&format!("g{}", next_id), 0, false);
		snippet.title = draft.file_name();
		snippet.description = draft.description.clone();
		snippet.code = draft.code.clone();
		snippet.language = draft.language.clone();
		snippet.is_public = draft.is_public;
		Ok(snippet)
	}

	async fn read(&self, id: &str) -> Result<Snippet, RemoteError> {
		self.record(format!("read {}", id))?;
		let mut snippet = create_test_snippet(id, 0, false);
		snippet.code = "fn main() {}".to_string();
		Ok(snippet)
	}

	async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, RemoteError> {
		self.record(format!(
			"update {} {}",
			id,
			patch.title.as_deref().unwrap_or("-")
		))?;
		let mut snippet = create_test_snippet(id, 0, false);
		if let Some(title) = &patch.title {
			snippet.title = title.clone();
		}
		snippet.description = patch.description.clone();
		snippet.code = patch.code.clone().unwrap_or_default();
		Ok(snippet)
	}

	async fn delete(&self, id: &str) -> Result<(), RemoteError> {
		self.record(format!("delete {}", id))
	}

	async fn set_star(&self, id: &str, starred: bool) -> Result<(), RemoteError> {
		self.record(format!("set_star {} {}", id, starred))
	}

	async fn is_starred(&self, id: &str) -> Result<bool, RemoteError> {
		self.record(format!("is_starred {}", id))?;
		Ok(self.starred.load(Ordering::SeqCst))
	}
}

fn draft(title: &str) -> SnippetDraft {
	SnippetDraft {
		title: title.to_string(),
		description: None,
		code: "print(1)".to_string(),
		language: "python".to_string(),
		is_public: true,
	}
}

async fn store_with(snippets: Vec<Snippet>) -> SnippetStore<FakeRemote> {
	let remote = FakeRemote::signed_in();
	*remote.listing.lock().unwrap() = snippets;
	let store = SnippetStore::new(remote);
	store.load_public().await.unwrap();
	store
}

#[tokio::test]
async fn test_create_prepends_newest_first() {
	let store = SnippetStore::new(FakeRemote::signed_in());

	for (i, title) in ["one", "two", "three"].iter().enumerate() {
		let created = store.create(draft(title)).await.unwrap();
		assert_eq!(store.len(), i + 1);
		assert_eq!(store.snippets()[0].id, created.id);
	}

	let titles: Vec<String> = store.snippets().into_iter().map(|s| s.title).collect();
	assert_eq!(titles, vec!["three.python", "two.python", "one.python"]);
}

#[tokio::test]
async fn test_create_derives_file_name() {
	let store = SnippetStore::new(FakeRemote::signed_in());

	let created = store.create(draft("foo")).await.unwrap();
	assert_eq!(created.id, "g1");

	let head = &store.snippets()[0];
	assert_eq!(head.id, "g1");
	assert_eq!(head.title, "foo.python");
	assert_eq!(head.code, "print(1)");
}

#[tokio::test]
async fn test_create_failure_leaves_collection_untouched() {
	let store = store_with(vec![create_test_snippet("a", 0, false)]).await;
	let before = store.snippets();

	store.remote().fail_next(RemoteError::Unauthorized);
	let result = store.create(draft("foo")).await;

	assert_eq!(result, Err(StoreError::Remote(RemoteError::Unauthorized)));
	assert_eq!(store.snippets(), before);
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_mutations_without_session_skip_the_network() {
	let remote = FakeRemote::default();
	*remote.listing.lock().unwrap() = vec![create_test_snippet("a", 2, false)];
	let store = SnippetStore::new(remote);
	// Public listing needs no session
	store.load_public().await.unwrap();

	assert_eq!(store.create(draft("foo")).await, Err(StoreError::Unauthenticated));
	assert_eq!(
		store.update("a", SnippetPatch::default()).await,
		Err(StoreError::Unauthenticated)
	);
	assert_eq!(store.delete("a").await, Err(StoreError::Unauthenticated));
	assert_eq!(store.toggle_star("a").await, Err(StoreError::Unauthenticated));
	assert_eq!(store.refresh_star("a").await, Err(StoreError::Unauthenticated));
	assert_eq!(store.load_mine().await, Err(StoreError::Unauthenticated));

	assert_eq!(store.remote().calls(), vec!["list_public"]);
	assert_eq!(store.len(), 1);
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_load_public_replaces_collection() {
	let store = store_with(vec![
		create_test_snippet("a", 0, false),
		create_test_snippet("b", 0, false),
	])
	.await;
	assert_eq!(store.len(), 2);

	*store.remote().listing.lock().unwrap() = vec![create_test_snippet("c", 0, false)];
	store.load_public().await.unwrap();

	let ids: Vec<String> = store.snippets().into_iter().map(|s| s.id).collect();
	assert_eq!(ids, vec!["c"]);
}

#[tokio::test]
async fn test_load_public_drops_duplicate_ids() {
	let store = store_with(vec![
		create_test_snippet("a", 1, false),
		create_test_snippet("b", 0, false),
		create_test_snippet("a", 9, false),
	])
	.await;

	assert_eq!(store.len(), 2);
	assert_eq!(store.find("a").unwrap().star_count, 1);
}

#[tokio::test]
async fn test_load_public_unauthorized_keeps_state() {
	let store = SnippetStore::new(FakeRemote::signed_in());

	store.remote().fail_next(RemoteError::Unauthorized);
	let result = store.load_public().await;

	assert_eq!(result, Err(StoreError::Remote(RemoteError::Unauthorized)));
	assert!(store.is_empty());
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_load_mine_lists_session_user() {
	let mut other = create_test_snippet("x", 0, false);
	other.owner.login = "someone".to_string();
	let remote = FakeRemote::signed_in();
	*remote.listing.lock().unwrap() = vec![create_test_snippet("a", 0, false), other];
	let store = SnippetStore::new(remote);

	store.load_mine().await.unwrap();

	assert_eq!(store.remote().calls(), vec!["list_user octocat"]);
	assert_eq!(store.len(), 1);
	assert!(store.find("a").is_some());
}

#[tokio::test]
async fn test_update_replaces_entry_in_place() {
	let store = store_with(vec![
		create_test_snippet("a", 0, false),
		create_test_snippet("b", 4, true),
		create_test_snippet("c", 0, false),
	])
	.await;

	let patch = SnippetPatch {
		title: None,
		description: Some("changed".to_string()),
		code: Some("fn b() {}".to_string()),
	};
	let updated = store.update("b", patch).await.unwrap();

	// Local title names the file when the patch has none
	assert!(store.remote().calls().contains(&"update b b.rs".to_string()));

	let snippets = store.snippets();
	assert_eq!(snippets[1], updated);
	assert_eq!(snippets[1].description.as_deref(), Some("changed"));
	// Full replacement: fields come from the remote result, not a merge
	assert_eq!(snippets[1].star_count, 0);
	assert_eq!(snippets[0].id, "a");
	assert_eq!(snippets[2].id, "c");
}

#[tokio::test]
async fn test_failed_update_leaves_entry_identical() {
	let store = store_with(vec![create_test_snippet("a", 3, true)]).await;
	let before = store.find("a").unwrap();

	store
		.remote()
		.fail_next(RemoteError::RequestFailed("500".to_string()));
	let patch = SnippetPatch {
		code: Some("changed".to_string()),
		..Default::default()
	};
	let result = store.update("a", patch).await;

	assert!(matches!(result, Err(StoreError::Remote(RemoteError::RequestFailed(_)))));
	assert_eq!(store.find("a").unwrap(), before);
}

#[tokio::test]
async fn test_delete_removes_entry() {
	let store = store_with(vec![
		create_test_snippet("a", 0, false),
		create_test_snippet("b", 0, false),
	])
	.await;

	store.delete("a").await.unwrap();

	assert_eq!(store.len(), 1);
	assert!(store.find("a").is_none());
}

#[tokio::test]
async fn test_failed_delete_keeps_entry() {
	let store = store_with(vec![create_test_snippet("a", 0, false)]).await;

	store
		.remote()
		.fail_next(RemoteError::RequestFailed("503".to_string()));
	assert!(store.delete("a").await.is_err());
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_toggle_star_reconciles_on_success() {
	let store = store_with(vec![create_test_snippet("a", 2, false)]).await;

	let starred = store.toggle_star("a").await.unwrap();
	assert!(starred.is_starred);
	assert_eq!(starred.star_count, 3);
	assert_eq!(store.find("a").unwrap(), starred);

	let unstarred = store.toggle_star("a").await.unwrap();
	assert!(!unstarred.is_starred);
	assert_eq!(unstarred.star_count, 2);

	assert!(store.remote().calls().ends_with(&[
		"set_star a true".to_string(),
		"set_star a false".to_string()
	]));
}

#[tokio::test]
async fn test_toggle_star_failure_leaves_entry_unchanged() {
	let store = store_with(vec![create_test_snippet("a", 2, false)]).await;
	let before = store.find("a").unwrap();

	store
		.remote()
		.fail_next(RemoteError::RequestFailed("502".to_string()));
	let result = store.toggle_star("a").await;

	assert!(matches!(result, Err(StoreError::Remote(_))));
	assert_eq!(store.find("a").unwrap(), before);
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_toggle_star_unknown_id() {
	let store = store_with(vec![]).await;

	assert_eq!(
		store.toggle_star("missing").await,
		Err(StoreError::NotFound("missing".to_string()))
	);
	assert!(!store.remote().calls().iter().any(|c| c.starts_with("set_star")));
}

#[tokio::test]
async fn test_unstar_never_goes_below_zero() {
	let store = store_with(vec![create_test_snippet("a", 0, true)]).await;

	let snippet = store.toggle_star("a").await.unwrap();
	assert!(!snippet.is_starred);
	assert_eq!(snippet.star_count, 0);
}

#[tokio::test]
async fn test_refresh_star_updates_flag_only() {
	let store = store_with(vec![create_test_snippet("a", 5, false)]).await;
	store.remote().starred.store(true, Ordering::SeqCst);

	assert_eq!(store.refresh_star("a").await, Ok(true));

	let entry = store.find("a").unwrap();
	assert!(entry.is_starred);
	assert_eq!(entry.star_count, 5);
	assert_eq!(
		store.refresh_star("missing").await,
		Err(StoreError::NotFound("missing".to_string()))
	);
}

#[tokio::test]
async fn test_get_by_id_always_reads_remote() {
	let store = store_with(vec![create_test_snippet("a", 0, false)]).await;

	let hydrated = store.get_by_id("a").await.unwrap();
	assert_eq!(hydrated.code, "fn main() {}");
	// The collection keeps the listed entry
	assert_eq!(store.find("a").unwrap().code, "");

	store
		.remote()
		.fail_next(RemoteError::NotFound("zzz".to_string()));
	assert_eq!(
		store.get_by_id("zzz").await,
		Err(StoreError::Remote(RemoteError::NotFound("zzz".to_string())))
	);
	assert!(store.remote().calls().contains(&"read a".to_string()));
}

#[tokio::test]
async fn test_loading_flag_raised_while_call_pending() {
	let store = Arc::new(SnippetStore::new(FakeRemote::signed_in()));
	let mut updates = store.loading_updates();
	assert!(!*updates.borrow_and_update());
	store.remote().hold();

	let pending = tokio::spawn({
		let store = store.clone();
		async move { store.create(draft("foo")).await }
	});
	store.remote().parked.notified().await;

	assert!(store.is_loading());
	updates.changed().await.unwrap();
	assert!(*updates.borrow_and_update());

	store.remote().release();
	pending.await.unwrap().unwrap();

	assert!(!store.is_loading());
	assert!(updates.has_changed().unwrap());
	assert!(!*updates.borrow_and_update());
}

#[tokio::test]
async fn test_load_mine_keeps_flag_raised_throughout() {
	let remote = FakeRemote::signed_in();
	*remote.listing.lock().unwrap() = vec![create_test_snippet("a", 0, false)];
	let store = SnippetStore::new(remote);
	store.remote().observe(store.loading_updates());

	store.load_mine().await.unwrap();

	// No idle blip between the session check and the listing
	assert_eq!(*store.remote().loading_changed_at_listing.lock().unwrap(), Some(false));
	assert_eq!(store.len(), 1);
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_load_listing_picks_the_listing() {
	let mut other = create_test_snippet("x", 0, false);
	other.owner.login = "someone".to_string();
	let listing = vec![create_test_snippet("a", 0, false), other];

	// A login without a session is listed anonymously
	let remote = FakeRemote::default();
	*remote.listing.lock().unwrap() = listing.clone();
	let store = SnippetStore::new(remote);
	store.load_listing(Some("someone")).await.unwrap();
	assert_eq!(store.len(), 1);
	assert!(store.find("x").is_some());
	store.load_listing(None).await.unwrap();
	assert_eq!(store.len(), 2);
	assert_eq!(store.remote().calls(), vec!["list_user someone", "list_public"]);

	let remote = FakeRemote::signed_in();
	*remote.listing.lock().unwrap() = listing;
	let store = SnippetStore::new(remote);
	store.load_listing(Some("octocat")).await.unwrap();
	assert_eq!(store.remote().calls(), vec!["list_user octocat"]);
	assert!(store.find("a").is_some());
}

#[tokio::test]
async fn test_empty_patch_skips_the_network() {
	let store = store_with(vec![create_test_snippet("a", 3, true)]).await;
	let before = store.find("a").unwrap();

	assert_eq!(store.update("a", SnippetPatch::default()).await, Ok(before.clone()));
	assert_eq!(
		store.update("missing", SnippetPatch::default()).await,
		Err(StoreError::NotFound("missing".to_string()))
	);

	assert_eq!(store.remote().calls(), vec!["list_public"]);
	assert_eq!(store.find("a").unwrap(), before);
	assert!(!store.is_loading());
}

#[tokio::test]
async fn test_view_applies_query() {
	let mut starred = create_test_snippet("b", 10, false);
	starred.title = "server.rs".to_string();
	let store = store_with(vec![create_test_snippet("a", 1, false), starred]).await;

	let view = store.view(&SnippetQuery::new("").with_sort(SortMode::Stars));
	let ids: Vec<&str> = view.iter().map(|s| s.id.as_str()).collect();
	assert_eq!(ids, vec!["b", "a"]);

	let view = store.view(&SnippetQuery::new("SERVER"));
	assert_eq!(view.len(), 1);
}

#[tokio::test]
async fn test_concurrent_mutations_are_serialized() {
	let store = Arc::new(SnippetStore::new(FakeRemote::signed_in()));
	store.remote().hold();

	let spawn_create = |title: &'static str| {
		let store = store.clone();
		tokio::spawn(async move { store.create(draft(title)).await })
	};
	let first = spawn_create("one");
	store.remote().parked.notified().await;

	let second = spawn_create("two");
	for _ in 0..16 {
		tokio::task::yield_now().await;
	}

	// The second create waits until the first has left the remote
	assert_eq!(store.remote().calls(), vec!["create one"]);
	assert!(store.is_loading());

	store.remote().release();
	let first = first.await.unwrap().unwrap();
	let second = second.await.unwrap().unwrap();

	assert_eq!(store.remote().calls(), vec!["create one", "create two"]);
	let ids: Vec<String> = store.snippets().into_iter().map(|s| s.id).collect();
	assert_eq!(ids, vec![second.id, first.id]);
	assert!(!store.is_loading());
}
