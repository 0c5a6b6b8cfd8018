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

//! Document list envelope

use serde::{Deserialize, Serialize};

/// Response of a `listDocuments` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList<T> {
    /// Total number of documents matching the queries (ignoring limit)
    pub total: u64,
    /// The documents on this page, in query order
    pub documents: Vec<T>,
}

impl<T> DocumentList<T> {
    /// Unwrap the envelope into the ordered documents
    pub fn into_documents(self) -> Vec<T> {
        self.documents
    }
}

impl<T> Default for DocumentList<T> {
    fn default() -> Self {
        Self {
            total: 0,
            documents: Vec::new(),
        }
    }
}
