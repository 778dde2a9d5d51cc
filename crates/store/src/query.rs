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

//! Query engine over an in-memory snippet snapshot
//!
//! Everything here is pure and synchronous: inputs are borrowed, never
//! mutated, and results are fresh vectors.

use std::{collections::BTreeSet, fmt, str::FromStr};

use gistdeck_sdk::Snippet;
use serde::{Deserialize, Serialize};

/// Ordering applied to a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
	/// Most recently created first
	#[default]
	Newest,
	Oldest,
	/// Highest star count first
	Stars,
}

impl fmt::Display for SortMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SortMode::Newest => "newest",
			SortMode::Oldest => "oldest",
			SortMode::Stars => "stars",
		};
		f.write_str(name)
	}
}

impl FromStr for SortMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"newest" => Ok(SortMode::Newest),
			"oldest" => Ok(SortMode::Oldest),
			"stars" => Ok(SortMode::Stars),
			other => Err(format!("Unknown sort mode: {}", other)),
		}
	}
}

/// Keep snippets whose title, description or code contains `query`
///
/// Matching is a case-insensitive substring test. A blank query keeps
/// everything in input order.
pub fn filter(snippets: &[Snippet], query: &str) -> Vec<Snippet> {
	if query.trim().is_empty() {
		return snippets.to_vec();
	}

	let needle = query.to_lowercase();
	snippets
		.iter()
		.filter(|s| {
			s.title.to_lowercase().contains(&needle)
				|| s
					.description
					.as_deref()
					.is_some_and(|d| d.to_lowercase().contains(&needle))
				|| s.code.to_lowercase().contains(&needle)
		})
		.cloned()
		.collect()
}

/// Keep snippets tagged with exactly `language`; `None` keeps everything
pub fn filter_language(snippets: &[Snippet], language: Option<&str>) -> Vec<Snippet> {
	match language {
		None => snippets.to_vec(),
		Some(language) => snippets
			.iter()
			.filter(|s| s.language == language)
			.cloned()
			.collect(),
	}
}

/// Stable sort by the given mode
pub fn sort(snippets: &[Snippet], mode: SortMode) -> Vec<Snippet> {
	let mut sorted = snippets.to_vec();
	match mode {
		SortMode::Newest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
		SortMode::Oldest => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
		SortMode::Stars => sorted.sort_by(|a, b| b.star_count.cmp(&a.star_count)),
	}
	sorted
}

/// Distinct languages present, for building filter menus
pub fn group_languages(snippets: &[Snippet]) -> BTreeSet<String> {
	snippets.iter().map(|s| s.language.clone()).collect()
}

/// Combined view parameters: text search, language filter and ordering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetQuery {
	#[serde(default)]
	pub text: String,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub sort: SortMode,
}

impl SnippetQuery {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			..Self::default()
		}
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	pub fn with_sort(mut self, sort: SortMode) -> Self {
		self.sort = sort;
		self
	}

	/// Text filter, then language filter, then sort
	pub fn apply(&self, snippets: &[Snippet]) -> Vec<Snippet> {
		let matched = filter(snippets, &self.text);
		let matched = filter_language(&matched, self.language.as_deref());
		sort(&matched, self.sort)
	}

	/// Whether anything differs from the default view
	pub fn has_active_filters(&self) -> bool {
		!self.text.is_empty() || self.language.is_some() || self.sort != SortMode::Newest
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}
