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

//! Appwrite API access

mod backend;
mod client;
mod query;

pub use backend::Backend;
pub use client::AppwriteClient;
pub use query::Query;

/// Generate a unique id for a new account, document, or file
///
/// Ids are 32 lowercase hex characters, inside Appwrite's 36 character limit.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
