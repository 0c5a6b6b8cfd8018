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

//! File and media models

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppwriteError;

/// Kind of file a URL is resolved for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AppwriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            other => Err(AppwriteError::InvalidFileType(other.to_string())),
        }
    }
}

/// Crop anchor for image previews
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Gravity {
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Gravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::Top => "top",
            Gravity::Bottom => "bottom",
            Gravity::Left => "left",
            Gravity::Right => "right",
            Gravity::TopLeft => "top-left",
            Gravity::TopRight => "top-right",
            Gravity::BottomLeft => "bottom-left",
            Gravity::BottomRight => "bottom-right",
        }
    }
}

/// Resize/crop parameters for a preview URL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewOptions {
    pub width: u32,
    pub height: u32,
    pub gravity: Gravity,
    /// JPEG/WebP quality, 0-100
    pub quality: u8,
}

/// Preview used for post thumbnails
pub const THUMBNAIL_PREVIEW: PreviewOptions = PreviewOptions {
    width: 2000,
    height: 2000,
    gravity: Gravity::Top,
    quality: 100,
};

/// A picked file as the UI's document/image picker describes it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileAsset {
    /// Local URI (`file:///...`) or plain path
    pub uri: String,

    #[serde(default, alias = "name")]
    pub file_name: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default, alias = "size")]
    pub file_size: Option<u64>,
}

impl FileAsset {
    /// Reshape the picker descriptor into an upload asset
    ///
    /// The picker's `mimeType` becomes the upload's `type`; everything else
    /// carries over.
    pub fn into_upload(self) -> UploadAsset {
        let path = PathBuf::from(self.uri.strip_prefix("file://").unwrap_or(&self.uri));
        let name = self
            .file_name
            .or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "upload".to_string());

        UploadAsset {
            name,
            mime_type: self.mime_type,
            size: self.file_size,
            path,
        }
    }
}

/// A file ready to be sent to a storage bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadAsset {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub path: PathBuf,
}

/// A file stored in a bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(rename = "bucketId", default)]
    pub bucket_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "mimeType", default)]
    pub mime_type: String,

    #[serde(rename = "sizeOriginal", default)]
    pub size: u64,
}
