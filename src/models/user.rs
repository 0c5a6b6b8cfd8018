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

//! Account and user profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An Appwrite account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Account id, issued by the service (or sent with the create call)
    #[serde(rename = "$id", default)]
    pub id: String,

    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub email: String,

    /// Display name; the sign-up username
    #[serde(default)]
    pub name: String,
}

/// A profile document in the users collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Document id
    #[serde(rename = "$id")]
    pub id: String,

    /// Id of the account that owns this profile
    #[serde(rename = "accountId", default)]
    pub account_id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub username: String,

    /// Avatar image URL
    #[serde(default)]
    pub avatar: String,
}

/// Fields written when a profile document is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserProfile {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
}

/// Sign-up request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Sign-in request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}
