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

//! Appwrite REST client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::AppwriteConfig;
use crate::error::{AppwriteError, AppwriteResult};
use crate::log_api_call;
use crate::models::{Account, DocumentList, PreviewOptions, Session, StoredFile, UploadAsset};

use super::{Backend, Query};

/// Response format the models are written against
const RESPONSE_FORMAT: &str = "1.5.0";
/// Header Appwrite uses to hand session cookies to non-browser clients
const FALLBACK_COOKIES: &str = "X-Fallback-Cookies";
/// Files larger than this are uploaded in chunks
const CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Appwrite REST client
///
/// Holds the project identity and the session cookie. One instance is
/// shared by every data-access call.
pub struct AppwriteClient {
    http: Client,
    endpoint: String,
    project_id: String,
    platform: String,
    chunk_size: usize,
    fallback_cookies: RwLock<Option<String>>,
}

impl AppwriteClient {
    /// Create a client for the configured endpoint and project
    pub fn new(config: &AppwriteConfig) -> AppwriteResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("aora-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoint = normalize_url(&config.endpoint);
        info!("Appwrite client for {} (project {})", endpoint, config.project_id);

        Ok(Self {
            http,
            endpoint,
            project_id: config.project_id.clone(),
            platform: config.platform.clone(),
            chunk_size: CHUNK_SIZE,
            fallback_cookies: RwLock::new(None),
        })
    }

    #[cfg(test)]
    fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(test)]
    async fn session_cookie(&self) -> Option<String> {
        self.fallback_cookies.read().await.clone()
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.endpoint, path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT)
            .header("Origin", format!("appwrite-android://{}", self.platform));

        if let Some(cookies) = self.fallback_cookies.read().await.as_deref() {
            builder = builder.header(FALLBACK_COOKIES, cookies);
        }

        builder
    }

    /// Send a request, remember any session cookie, and turn error statuses into errors
    async fn execute(&self, op: &str, builder: RequestBuilder) -> AppwriteResult<Response> {
        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        log_api_call!(op, response.url().path(), started.elapsed().as_millis() as u64);

        let cookies = response
            .headers()
            .get(FALLBACK_COOKIES)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && *v != "[]")
            .map(str::to_string);
        if let Some(cookies) = cookies {
            debug!("Session cookie updated by {}", op);
            *self.fallback_cookies.write().await = Some(cookies);
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = AppwriteError::from_response(status.as_u16(), &body);
        warn!("{} failed: {}", op, err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        op: &str,
        builder: RequestBuilder,
    ) -> AppwriteResult<T> {
        let response = self.execute(op, builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> AppwriteResult<String> {
        let mut url = Url::parse(&format!("{}{}", self.endpoint, path))
            .map_err(|e| AppwriteError::InvalidUrl(format!("{}{}: {}", self.endpoint, path, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("project", &self.project_id);
        }

        Ok(url.into())
    }

    async fn upload_chunk(
        &self,
        bucket_id: &str,
        file_id: &str,
        asset: &UploadAsset,
        chunk: Vec<u8>,
        range: Option<(usize, usize, usize)>,
    ) -> AppwriteResult<StoredFile> {
        let mut part = multipart::Part::bytes(chunk).file_name(asset.name.clone());
        if let Some(mime) = asset.mime_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let mut builder = self
            .request(Method::POST, &files_path(bucket_id))
            .await
            .multipart(form);

        if let Some((start, end, total)) = range {
            builder = builder.header("Content-Range", format!("bytes {}-{}/{}", start, end, total));
            if start > 0 {
                builder = builder.header("X-Appwrite-ID", file_id);
            }
        }

        self.send_json("storage.createFile", builder).await
    }
}

#[async_trait]
impl Backend for AppwriteClient {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppwriteResult<Account> {
        let builder = self.request(Method::POST, "/account").await.json(&json!({
            "userId": user_id,
            "email": email,
            "password": password,
            "name": name,
        }));

        self.send_json("account.create", builder).await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> AppwriteResult<Session> {
        let builder = self
            .request(Method::POST, "/account/sessions/email")
            .await
            .json(&json!({ "email": email, "password": password }));

        self.send_json("account.createEmailPasswordSession", builder).await
    }

    async fn get_current_session(&self) -> AppwriteResult<Session> {
        let builder = self.request(Method::GET, "/account/sessions/current").await;
        self.send_json("account.getSession", builder).await
    }

    async fn delete_current_session(&self) -> AppwriteResult<()> {
        let builder = self.request(Method::DELETE, "/account/sessions/current").await;
        self.execute("account.deleteSession", builder).await?;

        *self.fallback_cookies.write().await = None;
        Ok(())
    }

    async fn get_account(&self) -> AppwriteResult<Account> {
        let builder = self.request(Method::GET, "/account").await;
        self.send_json("account.get", builder).await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> AppwriteResult<DocumentList<Value>> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_string()))
            .collect();

        let builder = self
            .request(Method::GET, &documents_path(database_id, collection_id))
            .await
            .query(&params);

        self.send_json("databases.listDocuments", builder).await
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> AppwriteResult<Value> {
        let builder = self
            .request(Method::POST, &documents_path(database_id, collection_id))
            .await
            .json(&json!({ "documentId": document_id, "data": data }));

        self.send_json("databases.createDocument", builder).await
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        asset: &UploadAsset,
    ) -> AppwriteResult<StoredFile> {
        let mut file = tokio::fs::File::open(&asset.path).await?;
        let total = file.metadata().await?.len() as usize;

        if total <= self.chunk_size {
            let mut bytes = Vec::with_capacity(total);
            file.read_to_end(&mut bytes).await?;
            return self.upload_chunk(bucket_id, file_id, asset, bytes, None).await;
        }

        debug!(
            "Uploading {} ({} bytes) in chunks of {}",
            asset.name, total, self.chunk_size
        );

        let mut start = 0;
        loop {
            let len = self.chunk_size.min(total - start);
            let mut chunk = vec![0u8; len];
            file.read_exact(&mut chunk).await?;

            let end = start + len - 1;
            let stored = self
                .upload_chunk(bucket_id, file_id, asset, chunk, Some((start, end, total)))
                .await?;

            start = end + 1;
            if start >= total {
                return Ok(stored);
            }
        }
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> AppwriteResult<String> {
        self.build_url(&format!("{}/{}/view", files_path(bucket_id), encode(file_id)), &[])
    }

    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> AppwriteResult<String> {
        self.build_url(
            &format!("{}/{}/preview", files_path(bucket_id), encode(file_id)),
            &[
                ("width", options.width.to_string()),
                ("height", options.height.to_string()),
                ("gravity", options.gravity.as_str().to_string()),
                ("quality", options.quality.to_string()),
            ],
        )
    }

    fn initials_avatar_url(&self, name: &str) -> AppwriteResult<String> {
        self.build_url("/avatars/initials", &[("name", name.to_string())])
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn documents_path(database_id: &str, collection_id: &str) -> String {
    format!(
        "/databases/{}/collections/{}/documents",
        encode(database_id),
        encode(collection_id)
    )
}

fn files_path(bucket_id: &str) -> String {
    format!("/storage/buckets/{}/files", encode(bucket_id))
}

/// Normalize an endpoint URL
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    // Remove trailing slash
    url.trim_end_matches('/').to_string()
}
