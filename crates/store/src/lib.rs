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

//! Gistdeck snippet store
//!
//! This crate holds the session's view of the remote snippet collection and
//! keeps it consistent with the hosting API.
//!
//! Architecture:
//! - `SnippetRemote` seam over the SDK client (swappable for tests)
//! - `SnippetStore` owns the in-memory collection and reconciles it only
//!   after a remote call succeeds
//! - `query` derives filtered and sorted views from a snapshot, with no I/O

pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod remote;
pub mod store;

pub use error::StoreError;
pub use query::{SnippetQuery, SortMode, filter, filter_language, group_languages, sort};
pub use remote::SnippetRemote;
pub use store::SnippetStore;
