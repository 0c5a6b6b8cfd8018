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

//! Data access for the Aora screens
//!
//! Each operation maps one user intent onto one or two backend calls and
//! normalizes the result: document envelopes are unwrapped into ordered
//! lists and every failure surfaces as an [`AppwriteError`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{unique_id, Backend, Query};
use crate::config::AppwriteConfig;
use crate::error::{AppwriteError, AppwriteResult};
use crate::models::{
    FileAsset, FileType, NewPostDocument, NewUserProfile, Post, PostPage, Session, UserProfile,
    VideoForm, THUMBNAIL_PREVIEW,
};

/// Attribute every post listing is ordered by
const CREATED_AT: &str = "$createdAt";

/// Data-access operations against one Appwrite project
pub struct DataAccess<B: Backend> {
    backend: Arc<B>,
    config: Arc<AppwriteConfig>,
}

impl<B: Backend> Clone for DataAccess<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: Backend> DataAccess<B> {
    pub fn new(backend: Arc<B>, config: Arc<AppwriteConfig>) -> Self {
        Self { backend, config }
    }

    #[cfg(test)]
    pub fn config(&self) -> &AppwriteConfig {
        &self.config
    }

    /// Create an account, sign it in, and write its profile document
    ///
    /// The steps run in order with no rollback. If the profile write fails
    /// the account exists without a profile.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> AppwriteResult<UserProfile> {
        let account = self
            .backend
            .create_account(&unique_id(), email, password, username)
            .await?;

        if account.id.is_empty() {
            return Err(AppwriteError::MissingResult("account id"));
        }
        info!("Account {} created for {}", account.id, username);

        let avatar = self.backend.initials_avatar_url(username)?;

        self.sign_in(email, password).await?;

        let profile = NewUserProfile {
            account_id: account.id.clone(),
            email: email.to_string(),
            username: username.to_string(),
            avatar,
        };

        let document = self
            .backend
            .create_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                &unique_id(),
                serde_json::to_value(&profile)?,
            )
            .await
            .inspect_err(|e| {
                warn!("Account {} has no profile document: {}", account.id, e);
            })?;

        from_document(document)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppwriteResult<Session> {
        let session = self.backend.create_email_session(email, password).await?;
        debug!("Session {} created", session.id);
        Ok(session)
    }

    /// Delete the current session and return it
    pub async fn sign_out(&self) -> AppwriteResult<Session> {
        let session = self.backend.get_current_session().await?;
        self.backend.delete_current_session().await?;
        info!("Session {} deleted", session.id);
        Ok(session)
    }

    /// Profile of the signed-in account
    ///
    /// `Ok(None)` when there is no active session or the account has no
    /// profile document.
    pub async fn get_current_user(&self) -> AppwriteResult<Option<UserProfile>> {
        let account = match self.backend.get_account().await {
            Ok(account) => account,
            Err(e) if e.is_unauthorized() => {
                debug!("No active session");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let profiles: Vec<UserProfile> = self
            .list(
                &self.config.user_collection_id,
                &[Query::equal("accountId", account.id.as_str())],
            )
            .await?;

        if profiles.is_empty() {
            warn!("Account {} has no profile document", account.id);
        }

        Ok(profiles.into_iter().next())
    }

    /// Most recent posts, newest first
    pub async fn get_latest_posts(&self) -> AppwriteResult<Vec<Post>> {
        self.list(
            &self.config.video_collection_id,
            &[
                Query::order_desc(CREATED_AT),
                Query::limit(self.config.latest_posts_limit),
            ],
        )
        .await
    }

    /// One page of every post, newest first
    ///
    /// Pass the previous page's `next_cursor` to continue.
    pub async fn get_all_posts(&self, cursor: Option<&str>) -> AppwriteResult<PostPage> {
        let page_size = self.config.all_posts_page_size;
        let mut queries = vec![Query::order_desc(CREATED_AT), Query::limit(page_size)];
        if let Some(cursor) = cursor {
            queries.push(Query::cursor_after(cursor));
        }

        let posts: Vec<Post> = self.list(&self.config.video_collection_id, &queries).await?;

        let next_cursor = if posts.len() as u32 == page_size {
            posts.last().map(|p| p.id.clone())
        } else {
            None
        };

        Ok(PostPage { posts, next_cursor })
    }

    /// Posts whose title matches `query` under full-text search
    pub async fn search_posts(&self, query: &str) -> AppwriteResult<Vec<Post>> {
        self.list(
            &self.config.video_collection_id,
            &[Query::search("title", query)],
        )
        .await
    }

    /// Posts created by the profile `user_id`
    pub async fn get_user_posts(&self, user_id: &str) -> AppwriteResult<Vec<Post>> {
        self.list(
            &self.config.video_collection_id,
            &[Query::equal("creator", user_id)],
        )
        .await
    }

    /// URL for a stored file: the raw view for videos, a 2000x2000
    /// top-anchored preview for images
    pub fn get_file_preview(&self, file_id: &str, file_type: &str) -> AppwriteResult<String> {
        let bucket = &self.config.storage_id;

        match file_type.parse::<FileType>()? {
            FileType::Video => self.backend.file_view_url(bucket, file_id),
            FileType::Image => self
                .backend
                .file_preview_url(bucket, file_id, &THUMBNAIL_PREVIEW),
        }
    }

    /// Upload a picked file and return its URL
    ///
    /// Returns `Ok(None)` without touching the network when there is no file.
    pub async fn upload_file(
        &self,
        file: Option<FileAsset>,
        file_type: &str,
    ) -> AppwriteResult<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };
        file_type.parse::<FileType>()?;

        let asset = file.into_upload();
        let stored = self
            .backend
            .create_file(&self.config.storage_id, &unique_id(), &asset)
            .await?;
        debug!("Stored {} as {}", asset.name, stored.id);

        self.get_file_preview(&stored.id, file_type).map(Some)
    }

    /// Upload thumbnail and video together, then write the post
    pub async fn create_video(&self, form: VideoForm) -> AppwriteResult<Post> {
        let (thumbnail, video) = futures::try_join!(
            self.upload_file(form.thumbnail, FileType::Image.as_str()),
            self.upload_file(form.video, FileType::Video.as_str()),
        )?;

        let post = NewPostDocument {
            title: form.title,
            thumbnail,
            video,
            prompt: form.prompt,
            creator: form.user_id,
        };

        let document = self
            .backend
            .create_document(
                &self.config.database_id,
                &self.config.video_collection_id,
                &unique_id(),
                serde_json::to_value(&post)?,
            )
            .await
            .inspect_err(|e| {
                warn!("Uploaded media for '{}' has no post: {}", post.title, e);
            })?;

        let post: Post = from_document(document)?;
        info!("Post {} created", post.id);
        Ok(post)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> AppwriteResult<Vec<T>> {
        let list = self
            .backend
            .list_documents(&self.config.database_id, collection_id, queries)
            .await?;

        list.into_documents()
            .into_iter()
            .map(from_document)
            .collect()
    }
}

fn from_document<T: DeserializeOwned>(document: Value) -> AppwriteResult<T> {
    Ok(serde_json::from_value(document)?)
}
