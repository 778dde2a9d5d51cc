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

//! Gistdeck SDK - Client library for the remote snippet store
//!
//! This crate provides the snippet data model, a typed client for the
//! hosting API, and the credential seam the client is built on.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background tasks
//! - No local caching (callers own their snippet state)
//! - No environment or configuration loading

pub mod client;
pub mod credentials;
pub mod types;
mod wire;

pub use client::{Client, ClientConfig, RemoteError};
pub use credentials::{
	AnonymousCredentials, CredentialProvider, Session, SharedCredentials, StaticCredentials,
};
pub use types::*;
pub use wire::FALLBACK_LANGUAGE;
