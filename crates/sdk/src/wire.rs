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

//! Remote payload shapes and their normalization into [`Snippet`]
//!
//! The hosting API is treated as a partially-trusted schema: `id` and both
//! timestamps are required, everything else falls back to a default.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Owner, Snippet, SnippetDraft, SnippetPatch, UNTITLED};

/// Language tag used when neither the payload nor the file name provides one
pub const FALLBACK_LANGUAGE: &str = "text";

#[derive(Debug, Deserialize)]
pub(crate) struct GistPayload {
	id: Option<String>,
	description: Option<String>,
	#[serde(default)]
	public: bool,
	owner: Option<OwnerPayload>,
	#[serde(default)]
	files: BTreeMap<String, FilePayload>,
	created_at: Option<String>,
	updated_at: Option<String>,
	#[serde(default)]
	comments: u64,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
	#[serde(default)]
	login: String,
	id: Option<serde_json::Value>,
	avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilePayload {
	filename: Option<String>,
	language: Option<String>,
	content: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileContent {
	content: String,
}

/// Body of a create request
#[derive(Debug, Serialize)]
pub(crate) struct CreateBody {
	description: Option<String>,
	public: bool,
	files: BTreeMap<String, FileContent>,
}

impl CreateBody {
	pub(crate) fn from_draft(draft: &SnippetDraft) -> Self {
		let mut files = BTreeMap::new();
		files.insert(
			draft.file_name(),
			FileContent {
				content: draft.code.clone(),
			},
		);
		Self {
			description: draft.description.clone(),
			public: draft.is_public,
			files,
		}
	}
}

/// Body of an update request
#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody {
	#[serde(skip_serializing_if = "Option::is_none")]
	description: Option<String>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	files: BTreeMap<String, FileContent>,
}

impl UpdateBody {
	pub(crate) fn from_patch(patch: &SnippetPatch) -> Self {
		let mut files = BTreeMap::new();
		if let Some(code) = &patch.code {
			let name = patch.title.clone().unwrap_or_else(|| UNTITLED.to_string());
			files.insert(
				name,
				FileContent {
					content: code.clone(),
				},
			);
		}
		Self {
			description: patch.description.clone(),
			files,
		}
	}
}

fn parse_timestamp(value: Option<&str>, field: &str) -> Result<DateTime<Utc>, String> {
	let raw = value.ok_or_else(|| format!("missing field `{}`", field))?;
	DateTime::parse_from_rfc3339(raw)
		.map(|ts| ts.with_timezone(&Utc))
		.map_err(|e| format!("invalid `{}` ({}): {}", field, raw, e))
}

fn language_from_name(name: &str) -> Option<String> {
	name.rsplit_once('.')
		.map(|(_, ext)| ext)
		.filter(|ext| !ext.is_empty())
		.map(str::to_string)
}

impl GistPayload {
	/// Validate the payload and convert it into the local model
	pub(crate) fn into_snippet(self) -> Result<Snippet, String> {
		let id = self
			.id
			.filter(|id| !id.is_empty())
			.ok_or_else(|| "missing field `id`".to_string())?;
		let created_at = parse_timestamp(self.created_at.as_deref(), "created_at")?;
		let updated_at = parse_timestamp(self.updated_at.as_deref(), "updated_at")?;

		let description = self.description.filter(|d| !d.is_empty());

		let (title, code, language) = match self.files.into_iter().next() {
			Some((key, file)) => {
				let name = file.filename.unwrap_or(key);
				let language = file
					.language
					.filter(|l| !l.is_empty())
					.or_else(|| language_from_name(&name))
					.unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());
				(name, file.content.unwrap_or_default(), language)
			}
			None => (
				description.clone().unwrap_or_else(|| UNTITLED.to_string()),
				String::new(),
				FALLBACK_LANGUAGE.to_string(),
			),
		};

		let owner = self
			.owner
			.map(|o| Owner {
				login: o.login,
				id: match o.id {
					Some(serde_json::Value::String(s)) => s,
					Some(serde_json::Value::Number(n)) => n.to_string(),
					_ => String::new(),
				},
				avatar_url: o.avatar_url,
			})
			.unwrap_or_default();

		Ok(Snippet {
			id,
			title,
			description,
			code,
			language,
			is_public: self.public,
			owner,
			created_at,
			updated_at,
			star_count: 0,
			is_starred: false,
			comments: self.comments,
		})
	}
}
