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

//! Session credentials for the remote client
//!
//! The client never acquires or refreshes credentials itself. A
//! [`CredentialProvider`] is injected at construction time and queried on
//! every request, so the session can change underneath a live client.

use std::sync::RwLock;

/// Authenticated identity context
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
	/// Login name of the signed-in account
	pub login: String,
	/// Bearer token sent to the remote store
	pub token: String,
}

impl Session {
	pub fn new(login: impl Into<String>, token: impl Into<String>) -> Self {
		Self {
			login: login.into(),
			token: token.into(),
		}
	}
}

// Keep tokens out of logs.
impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("login", &self.login)
			.field("token", &"<redacted>")
			.finish()
	}
}

/// Source of the current session
pub trait CredentialProvider: Send + Sync {
	/// Current session, or `None` when nobody is signed in
	fn session(&self) -> Option<Session>;
}

/// Provider that always returns the same session
#[derive(Debug, Clone)]
pub struct StaticCredentials {
	session: Session,
}

impl StaticCredentials {
	pub fn new(session: Session) -> Self {
		Self { session }
	}
}

impl CredentialProvider for StaticCredentials {
	fn session(&self) -> Option<Session> {
		Some(self.session.clone())
	}
}

/// Provider with no session
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousCredentials;

impl CredentialProvider for AnonymousCredentials {
	fn session(&self) -> Option<Session> {
		None
	}
}

/// Provider whose session can be swapped at runtime (sign-in / sign-out)
#[derive(Debug, Default)]
pub struct SharedCredentials {
	session: RwLock<Option<Session>>,
}

impl SharedCredentials {
	pub fn new(session: Option<Session>) -> Self {
		Self {
			session: RwLock::new(session),
		}
	}

	pub fn sign_in(&self, session: Session) {
		*self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
	}

	pub fn sign_out(&self) {
		*self.session.write().unwrap_or_else(|e| e.into_inner()) = None;
	}
}

impl CredentialProvider for SharedCredentials {
	fn session(&self) -> Option<Session> {
		self.session
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}
}
