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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name used for a file entry when no title is available
pub const UNTITLED: &str = "Untitled";

/// Identity that created a snippet
///
/// This is a snapshot taken from the remote payload, not a live relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
	/// Login name
	pub login: String,
	/// Remote account identifier
	pub id: String,
	/// Avatar image URL
	pub avatar_url: Option<String>,
}

/// A titled, language-tagged block of code held by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
	/// Identifier assigned by the remote store
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	/// Full text body (empty until hydrated from a single-snippet read)
	pub code: String,
	/// Free-form language tag
	pub language: String,
	pub is_public: bool,
	pub owner: Owner,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub star_count: u64,
	/// Whether the current session has starred this snippet
	#[serde(default)]
	pub is_starred: bool,
	#[serde(default)]
	pub comments: u64,
}

/// Input for creating a snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetDraft {
	pub title: String,
	pub description: Option<String>,
	pub code: String,
	pub language: String,
	pub is_public: bool,
}

impl SnippetDraft {
	/// File name submitted to the remote store
	///
	/// The language is appended as an extension when the title has none.
	pub fn file_name(&self) -> String {
		if self.title.contains('.') {
			self.title.clone()
		} else {
			format!("{}.{}", self.title, self.language)
		}
	}
}

/// Partial changes for an existing snippet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetPatch {
	/// File name to write `code` under
	pub title: Option<String>,
	pub description: Option<String>,
	pub code: Option<String>,
}

impl SnippetPatch {
	pub fn is_empty(&self) -> bool {
		self.title.is_none() && self.description.is_none() && self.code.is_none()
	}
}
