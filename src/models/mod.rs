// Aora - A short-video sharing client
// Copyright (C) 2025 Aora Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data models for Aora
//!
//! These models represent the records the Appwrite backend owns (accounts,
//! sessions, profile and video documents, stored files) and the IPC messages
//! exchanged with the UI host.

mod document;
mod ipc_message;
mod media;
mod post;
mod session;
mod user;

pub use document::*;
pub use ipc_message::*;
pub use media::*;
pub use post::*;
pub use session::*;
pub use user::*;
