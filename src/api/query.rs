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

//! Document queries
//!
//! Appwrite takes each query as a JSON object in a repeated `queries[]`
//! parameter: `{"attribute":"accountId","method":"equal","values":["..."]}`.

use serde_json::{json, Value};

/// A single filter, ordering, or paging instruction for `listDocuments`
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal { attribute: String, values: Vec<Value> },
    Search { attribute: String, value: String },
    OrderDesc(String),
    Limit(u32),
    CursorAfter(String),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Full-text search; the attribute needs a fulltext index
    pub fn search(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Search {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    pub fn cursor_after(document_id: impl Into<String>) -> Self {
        Query::CursorAfter(document_id.into())
    }

    /// JSON form sent on the wire
    pub fn to_value(&self) -> Value {
        match self {
            Query::Equal { attribute, values } => json!({
                "attribute": attribute,
                "method": "equal",
                "values": values,
            }),
            Query::Search { attribute, value } => json!({
                "attribute": attribute,
                "method": "search",
                "values": [value],
            }),
            Query::OrderDesc(attribute) => json!({
                "attribute": attribute,
                "method": "orderDesc",
            }),
            Query::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
            Query::CursorAfter(id) => json!({
                "method": "cursorAfter",
                "values": [id],
            }),
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
