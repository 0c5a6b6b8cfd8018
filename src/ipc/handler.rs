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

//! IPC message handler

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::access::DataAccess;
use crate::api::Backend;
use crate::error::{AppwriteError, AppwriteResult};
use crate::log_ipc;
use crate::models::{
    error_codes, events, methods, FileAsset, IpcError, IpcMessage, SignInRequest, SignUpRequest,
    VideoForm,
};
use crate::screens::{SearchBody, SearchOutcome, SearchScreen};

/// Capacity of the event channel shared by all connected clients
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

#[derive(Debug, Default, Deserialize)]
struct AllPostsParams {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPostsParams {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    file_id: String,
    #[serde(alias = "type")]
    file_type: String,
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    #[serde(default)]
    file: Option<FileAsset>,
    #[serde(alias = "type")]
    file_type: String,
}

/// Handles incoming IPC messages and routes them to appropriate handlers
pub struct MessageHandler<B: Backend> {
    access: DataAccess<B>,
    search: SearchScreen<B>,
    events: broadcast::Sender<IpcMessage>,
    shutdown: broadcast::Sender<()>,
}

impl<B: Backend> MessageHandler<B> {
    /// Create a new message handler
    pub fn new(access: DataAccess<B>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (shutdown, _) = broadcast::channel(1);

        Self {
            search: SearchScreen::new(access.clone()),
            access,
            events,
            shutdown,
        }
    }

    /// Receive events pushed to clients
    pub fn subscribe_events(&self) -> broadcast::Receiver<IpcMessage> {
        self.events.subscribe()
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    /// Handle an incoming IPC message
    pub async fn handle_message(&self, msg: IpcMessage) -> IpcMessage {
        let method = msg.method.as_deref().unwrap_or("unknown");
        log_ipc!(request, method, &msg.id);

        let result = match method {
            // System methods
            methods::PING => self.handle_ping(&msg).await,
            methods::SHUTDOWN => self.handle_shutdown(&msg).await,

            // Authentication methods
            methods::AUTH_SIGN_UP => self.handle_sign_up(&msg).await,
            methods::AUTH_SIGN_IN => self.handle_sign_in(&msg).await,
            methods::AUTH_SIGN_OUT => self.handle_sign_out(&msg).await,
            methods::AUTH_CURRENT_USER => self.handle_current_user(&msg).await,

            // Post methods
            methods::POSTS_LATEST => self.handle_posts_latest(&msg).await,
            methods::POSTS_ALL => self.handle_posts_all(&msg).await,
            methods::POSTS_SEARCH => self.handle_posts_search(&msg).await,
            methods::POSTS_USER => self.handle_posts_user(&msg).await,
            methods::POSTS_CREATE => self.handle_posts_create(&msg).await,

            // File methods
            methods::FILES_PREVIEW => self.handle_files_preview(&msg).await,
            methods::FILES_UPLOAD => self.handle_files_upload(&msg).await,

            // Search screen methods
            methods::SEARCH_OPEN => self.handle_search_query(&msg, true).await,
            methods::SEARCH_SET_QUERY => self.handle_search_query(&msg, false).await,
            methods::SEARCH_VIEW => self.handle_search_view(&msg).await,

            // Unknown method
            _ => {
                warn!("Unknown method: {}", method);
                IpcMessage::response_err(
                    &msg.id,
                    IpcError::new(error_codes::METHOD_NOT_FOUND, format!("Unknown method: {}", method)),
                )
            }
        };

        let success = result.error.is_none();
        log_ipc!(response, method, &msg.id, success);

        result
    }

    /// Handle ping request
    async fn handle_ping(&self, msg: &IpcMessage) -> IpcMessage {
        IpcMessage::response_ok(&msg.id, serde_json::json!({
            "pong": true,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Handle shutdown request
    async fn handle_shutdown(&self, msg: &IpcMessage) -> IpcMessage {
        info!("Shutdown requested via IPC");
        let _ = self.shutdown.send(());
        IpcMessage::response_ok(&msg.id, serde_json::json!({
            "status": "shutting_down"
        }))
    }

    async fn handle_sign_up(&self, msg: &IpcMessage) -> IpcMessage {
        let request: SignUpRequest = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        info!("Creating account for {}", request.username);
        let result = self
            .access
            .create_user(&request.email, &request.password, &request.username)
            .await;
        reply(msg, "sign up", result)
    }

    async fn handle_sign_in(&self, msg: &IpcMessage) -> IpcMessage {
        let request: SignInRequest = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let result = self.access.sign_in(&request.email, &request.password).await;
        reply(msg, "sign in", result)
    }

    async fn handle_sign_out(&self, msg: &IpcMessage) -> IpcMessage {
        let result = self.access.sign_out().await;
        if result.is_ok() {
            info!("User signed out");
        }
        reply(msg, "sign out", result)
    }

    async fn handle_current_user(&self, msg: &IpcMessage) -> IpcMessage {
        let result = self.access.get_current_user().await;
        reply(msg, "fetch current user", result)
    }

    async fn handle_posts_latest(&self, msg: &IpcMessage) -> IpcMessage {
        debug!("Fetching latest posts");
        let result = self.access.get_latest_posts().await;
        reply(msg, "fetch latest posts", result)
    }

    async fn handle_posts_all(&self, msg: &IpcMessage) -> IpcMessage {
        let request: AllPostsParams = match &msg.params {
            Some(_) => match params(msg) {
                Ok(r) => r,
                Err(response) => return response,
            },
            None => AllPostsParams::default(),
        };

        let result = self.access.get_all_posts(request.cursor.as_deref()).await;
        reply(msg, "fetch posts", result)
    }

    async fn handle_posts_search(&self, msg: &IpcMessage) -> IpcMessage {
        let request: SearchParams = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let result = self.access.search_posts(&request.query).await;
        reply(msg, "search posts", result)
    }

    async fn handle_posts_user(&self, msg: &IpcMessage) -> IpcMessage {
        let request: UserPostsParams = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let result = self.access.get_user_posts(&request.user_id).await;
        reply(msg, "fetch user posts", result)
    }

    async fn handle_posts_create(&self, msg: &IpcMessage) -> IpcMessage {
        let form: VideoForm = match params(msg) {
            Ok(f) => f,
            Err(response) => return response,
        };

        let result = self.access.create_video(form).await;
        reply(msg, "create post", result)
    }

    async fn handle_files_preview(&self, msg: &IpcMessage) -> IpcMessage {
        let request: PreviewParams = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let result = self
            .access
            .get_file_preview(&request.file_id, &request.file_type)
            .map(|url| serde_json::json!({ "url": url }));
        reply(msg, "resolve file URL", result)
    }

    async fn handle_files_upload(&self, msg: &IpcMessage) -> IpcMessage {
        let request: UploadParams = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let result = self
            .access
            .upload_file(request.file, &request.file_type)
            .await
            .map(|url| serde_json::json!({ "url": url }));
        reply(msg, "upload file", result)
    }

    async fn handle_search_query(&self, msg: &IpcMessage, open: bool) -> IpcMessage {
        let request: SearchParams = match params(msg) {
            Ok(r) => r,
            Err(response) => return response,
        };

        let outcome = if open {
            self.search.open(&request.query).await
        } else {
            self.search.set_query(&request.query).await
        };

        match outcome {
            SearchOutcome::Applied(view) => {
                if let SearchBody::Failed { message } = &view.body {
                    self.publish(events::ERROR, &serde_json::json!({
                        "source": "search",
                        "query": view.header.query,
                        "message": message
                    }));
                }
                self.publish(events::SEARCH_UPDATED, &view);
                reply(msg, "search", Ok(serde_json::json!({
                    "applied": true,
                    "view": view
                })))
            }
            SearchOutcome::Stale { generation, query } => {
                let view = self.search.view().await;
                reply(msg, "search", Ok(serde_json::json!({
                    "applied": false,
                    "stale": { "generation": generation, "query": query },
                    "view": view
                })))
            }
        }
    }

    async fn handle_search_view(&self, msg: &IpcMessage) -> IpcMessage {
        let view = self.search.view().await;
        reply(msg, "render search", Ok(view))
    }

    /// Push an event to every connected client
    fn publish<T: Serialize>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => {
                // No receivers just means no client is connected
                let _ = self.events.send(IpcMessage::event(event, value));
                log_ipc!(event, event);
            }
            Err(e) => error!("Failed to serialize {} event: {}", event, e),
        }
    }
}

/// Deserialize request params, or build the error response
fn params<T: DeserializeOwned>(msg: &IpcMessage) -> Result<T, IpcMessage> {
    let params = msg.params.clone().ok_or_else(|| {
        IpcMessage::response_err(
            &msg.id,
            IpcError::new(error_codes::INVALID_PARAMS, "Missing params"),
        )
    })?;

    serde_json::from_value(params).map_err(|e| {
        IpcMessage::response_err(
            &msg.id,
            IpcError::new(error_codes::INVALID_PARAMS, format!("Invalid params: {}", e)),
        )
    })
}

/// Build the response for an access result
fn reply<T: Serialize>(msg: &IpcMessage, action: &str, result: AppwriteResult<T>) -> IpcMessage {
    let value = match result {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            return IpcMessage::response_err(&msg.id, ipc_error(action, &e));
        }
    };

    match serde_json::to_value(value) {
        Ok(value) => IpcMessage::response_ok(&msg.id, value),
        Err(e) => {
            error!("Failed to encode {} result: {}", action, e);
            IpcMessage::response_err(
                &msg.id,
                IpcError::new(
                    error_codes::INTERNAL_ERROR,
                    format!("Failed to encode {} result: {}", action, e),
                ),
            )
        }
    }
}

/// Map an access error onto an IPC error code
fn ipc_error(action: &str, err: &AppwriteError) -> IpcError {
    let code = match err {
        AppwriteError::InvalidFileType(_) => error_codes::INVALID_FILE_TYPE,
        AppwriteError::Network(_) | AppwriteError::Io(_) => error_codes::NETWORK_ERROR,
        e if e.is_unauthorized() => error_codes::NOT_AUTHENTICATED,
        e if e.http_status() == Some(429) => error_codes::RATE_LIMITED,
        _ => error_codes::API_ERROR,
    };

    let error = IpcError::new(code, format!("Failed to {}: {}", action, err));
    match (err.http_status(), err.kind()) {
        (Some(status), Some(kind)) => error.with_data(serde_json::json!({
            "status": status,
            "kind": kind,
        })),
        _ => error,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::FakeBackend;

    fn handler() -> (Arc<FakeBackend>, MessageHandler<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new());
        let handler = MessageHandler::new(backend.access());
        (backend, handler)
    }

    fn request(method: &str, params: Option<serde_json::Value>) -> IpcMessage {
        IpcMessage::request(method, params)
    }

    #[tokio::test]
    async fn ping_pongs() {
        let (_, handler) = handler();
        let msg = request(methods::PING, None);

        let response = handler.handle_message(msg.clone()).await;
        assert_eq!(response.id, msg.id);
        assert_eq!(response.result.unwrap()["pong"], true);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let (_, handler) = handler();
        let response = handler.handle_message(request("posts.delete", None)).await;

        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_params_are_rejected() {
        let (backend, handler) = handler();
        let response = handler.handle_message(request(methods::POSTS_SEARCH, None)).await;

        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_file_type_has_its_own_code() {
        let (_, handler) = handler();
        let response = handler
            .handle_message(request(
                methods::FILES_PREVIEW,
                Some(json!({ "file_id": "f1", "type": "document" })),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_FILE_TYPE);
        assert!(error.message.contains("document"));
    }

    #[tokio::test]
    async fn upload_without_file_returns_null_url() {
        let (backend, handler) = handler();
        let response = handler
            .handle_message(request(methods::FILES_UPLOAD, Some(json!({ "file_type": "image" }))))
            .await;

        assert_eq!(response.result.unwrap(), json!({ "url": null }));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn bad_credentials_map_to_not_authenticated() {
        let (_, handler) = handler();
        let response = handler
            .handle_message(request(
                methods::AUTH_SIGN_IN,
                Some(json!({ "email": "nobody@example.com", "password": "x" })),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::NOT_AUTHENTICATED);
        assert_eq!(error.data.unwrap()["kind"], "user_invalid_credentials");
    }

    #[tokio::test]
    async fn current_user_is_null_when_signed_out() {
        let (_, handler) = handler();
        let response = handler.handle_message(request(methods::AUTH_CURRENT_USER, None)).await;

        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn sign_up_then_current_user() {
        let (_, handler) = handler();
        let sign_up = handler
            .handle_message(request(
                methods::AUTH_SIGN_UP,
                Some(json!({ "email": "jo@example.com", "password": "secret123", "username": "jo" })),
            ))
            .await;
        let profile = sign_up.result.unwrap();

        let current = handler.handle_message(request(methods::AUTH_CURRENT_USER, None)).await;
        assert_eq!(current.result.unwrap(), profile);
    }

    #[tokio::test]
    async fn search_open_publishes_view() {
        let (_, handler) = handler();
        let mut rx = handler.subscribe_events();

        let response = handler
            .handle_message(request(methods::SEARCH_OPEN, Some(json!({ "query": "cat" }))))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["applied"], true);
        assert_eq!(result["view"]["body"]["kind"], "empty");
        assert_eq!(result["view"]["body"]["title"], "No Videos Found");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.method.as_deref(), Some(events::SEARCH_UPDATED));
        assert_eq!(event.params.unwrap()["header"]["query"], "cat");
    }

    #[tokio::test]
    async fn failed_search_publishes_error_event() {
        let (backend, handler) = handler();
        backend.fail_reads_from(&backend.access().config().video_collection_id);
        let mut rx = handler.subscribe_events();

        let response = handler
            .handle_message(request(methods::SEARCH_OPEN, Some(json!({ "query": "cat" }))))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["view"]["body"]["kind"], "failed");

        let error = rx.recv().await.unwrap();
        assert_eq!(error.method.as_deref(), Some(events::ERROR));
        assert_eq!(error.params.unwrap()["query"], "cat");

        let updated = rx.recv().await.unwrap();
        assert_eq!(updated.method.as_deref(), Some(events::SEARCH_UPDATED));
    }

    #[test]
    fn unencodable_result_is_an_internal_error() {
        let mut keyed = std::collections::HashMap::new();
        keyed.insert(vec![1u8], "not a JSON object key");

        let response = reply(&request(methods::PING, None), "render", Ok(keyed));

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INTERNAL_ERROR);
        assert!(error.data.is_none());
    }

    #[tokio::test]
    async fn shutdown_signals_server() {
        let (_, handler) = handler();
        let mut shutdown = handler.shutdown_signal();

        handler.handle_message(request(methods::SHUTDOWN, None)).await;
        assert!(shutdown.recv().await.is_ok());
    }
}
