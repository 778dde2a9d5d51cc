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

use gistdeck_sdk::RemoteError;
use thiserror::Error;

/// Error types for store operations
///
/// Every error leaves the in-memory collection as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	#[error("No active session")]
	Unauthenticated,
	#[error("Snippet not in local collection: {0}")]
	NotFound(String),
	#[error(transparent)]
	Remote(#[from] RemoteError),
}

impl StoreError {
	/// Whether the remote store rejected the session's credentials
	pub fn is_unauthorized(&self) -> bool {
		matches!(
			self,
			StoreError::Unauthenticated | StoreError::Remote(RemoteError::Unauthorized)
		)
	}
}
