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

//! Video post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FileAsset, UserProfile};

/// Creator of a post
///
/// The `creator` attribute is a relationship. Appwrite expands it into the
/// profile document when the relationship is loaded, and returns only the id
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Creator {
    Profile(UserProfile),
    Id(String),
}

impl Creator {
    /// Username, when the profile was expanded and has one
    pub fn username(&self) -> Option<&str> {
        match self {
            Creator::Profile(profile) => non_empty(&profile.username),
            Creator::Id(_) => None,
        }
    }

    pub fn avatar(&self) -> Option<&str> {
        match self {
            Creator::Profile(profile) => non_empty(&profile.avatar),
            Creator::Id(_) => None,
        }
    }
}

/// A video post document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Document id
    #[serde(rename = "$id")]
    pub id: String,

    /// When the document was created
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Empty when the document has no title
    #[serde(default)]
    pub title: String,

    /// Thumbnail preview URL
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Video view URL
    #[serde(default)]
    pub video: Option<String>,

    /// AI prompt the video was made with
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub creator: Option<Creator>,
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Fields written when a post document is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostDocument {
    pub title: String,
    pub thumbnail: Option<String>,
    pub video: Option<String>,
    pub prompt: Option<String>,
    /// Profile document id of the author
    pub creator: String,
}

/// Form submitted from the create screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoForm {
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<FileAsset>,
    #[serde(default)]
    pub video: Option<FileAsset>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Profile document id of the author
    pub user_id: String,
}

/// One page of posts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Cursor for the next page, `None` when this page was the last
    pub next_cursor: Option<String>,
}
