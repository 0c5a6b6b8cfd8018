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

//! Remote backend interface
//!
//! Every call the data-access layer makes against the hosted service goes
//! through this trait. [`AppwriteClient`](super::AppwriteClient) is the REST
//! implementation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppwriteResult;
use crate::models::{Account, DocumentList, PreviewOptions, Session, StoredFile, UploadAsset};

use super::Query;

#[async_trait]
pub trait Backend: Send + Sync {
    // Accounts and sessions

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppwriteResult<Account>;

    async fn create_email_session(&self, email: &str, password: &str) -> AppwriteResult<Session>;

    async fn get_current_session(&self) -> AppwriteResult<Session>;

    async fn delete_current_session(&self) -> AppwriteResult<()>;

    async fn get_account(&self) -> AppwriteResult<Account>;

    // Documents

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> AppwriteResult<DocumentList<Value>>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> AppwriteResult<Value>;

    // Storage

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        asset: &UploadAsset,
    ) -> AppwriteResult<StoredFile>;

    /// URL that serves the stored file as-is
    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> AppwriteResult<String>;

    /// URL that serves a resized/cropped rendition of a stored image
    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> AppwriteResult<String>;

    // Avatars

    /// URL of an avatar image built from the initials of `name`
    fn initials_avatar_url(&self, name: &str) -> AppwriteResult<String>;
}
