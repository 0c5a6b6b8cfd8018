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

//! Envelope exchanged with the UI host
//!
//! One JSON object per line. Requests carry a `method` and optional
//! `params`; the response reuses the request `id` and carries either
//! `result` or `error`. Events are pushed unprompted with a fresh id.
//! Absent fields are omitted on the wire and may be omitted by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Request,
    Response,
    Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcMessage {
    pub id: String,

    #[serde(rename = "type")]
    pub message_type: MessageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<IpcError>,
}

impl IpcMessage {
    fn bare(id: String, message_type: MessageType) -> Self {
        Self {
            id,
            message_type,
            method: None,
            params: None,
            result: None,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn request(method: &str, params: Option<Value>) -> Self {
        Self {
            method: Some(method.to_string()),
            params,
            ..Self::bare(uuid::Uuid::new_v4().to_string(), MessageType::Request)
        }
    }

    /// Successful reply to the request `id`
    pub fn response_ok(id: &str, result: Value) -> Self {
        Self {
            result: Some(result),
            ..Self::bare(id.to_string(), MessageType::Response)
        }
    }

    /// Failed reply to the request `id`
    pub fn response_err(id: &str, error: IpcError) -> Self {
        Self {
            error: Some(error),
            ..Self::bare(id.to_string(), MessageType::Response)
        }
    }

    /// Unsolicited notification; `name` is one of [`events`]
    pub fn event(name: &str, payload: Value) -> Self {
        Self {
            method: Some(name.to_string()),
            params: Some(payload),
            ..Self::bare(uuid::Uuid::new_v4().to_string(), MessageType::Event)
        }
    }
}

/// Failure detail of a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcError {
    /// One of [`error_codes`]
    pub code: i32,
    pub message: String,
    /// Remote status and error type, when the failure came from Appwrite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl IpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Error codes: JSON-RPC reserved range, then application codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Appwrite and data-access failures
    pub const NOT_AUTHENTICATED: i32 = -1001;
    pub const RATE_LIMITED: i32 = -1002;
    pub const NETWORK_ERROR: i32 = -1003;
    pub const API_ERROR: i32 = -1004;
    pub const INVALID_FILE_TYPE: i32 = -1005;
}

/// IPC method names
pub mod methods {
    // Authentication
    pub const AUTH_SIGN_UP: &str = "auth.sign_up";
    pub const AUTH_SIGN_IN: &str = "auth.sign_in";
    pub const AUTH_SIGN_OUT: &str = "auth.sign_out";
    pub const AUTH_CURRENT_USER: &str = "auth.current_user";

    // Posts
    pub const POSTS_LATEST: &str = "posts.latest";
    pub const POSTS_ALL: &str = "posts.all";
    pub const POSTS_SEARCH: &str = "posts.search";
    pub const POSTS_USER: &str = "posts.user";
    pub const POSTS_CREATE: &str = "posts.create";

    // Files
    pub const FILES_PREVIEW: &str = "files.preview";
    pub const FILES_UPLOAD: &str = "files.upload";

    // Search screen
    pub const SEARCH_OPEN: &str = "search.open";
    pub const SEARCH_SET_QUERY: &str = "search.set_query";
    pub const SEARCH_VIEW: &str = "search.view";

    // System
    pub const PING: &str = "ping";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Event names pushed to the UI host
pub mod events {
    pub const SEARCH_UPDATED: &str = "event.search_updated";
    pub const ERROR: &str = "event.error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_keeps_request_id() {
        let request = IpcMessage::request(methods::PING, None);
        let response = IpcMessage::response_ok(&request.id, serde_json::json!({ "pong": true }));

        assert_eq!(response.id, request.id);
        assert_eq!(response.message_type, MessageType::Response);
        assert!(response.error.is_none());
    }

    #[test]
    fn message_type_uses_type_key() {
        let line = r#"{"id":"1","type":"request","method":"posts.search","params":{"query":"cat"}}"#;
        let msg: IpcMessage = serde_json::from_str(line).unwrap();

        assert_eq!(msg.message_type, MessageType::Request);
        assert_eq!(msg.method.as_deref(), Some(methods::POSTS_SEARCH));
    }

    #[test]
    fn absent_fields_are_not_written() {
        let json = serde_json::to_value(IpcMessage::response_ok("3", serde_json::json!([]))).unwrap();

        assert_eq!(json, serde_json::json!({ "id": "3", "type": "response", "result": [] }));
    }

    #[test]
    fn error_carries_data() {
        let err = IpcError::new(error_codes::API_ERROR, "boom")
            .with_data(serde_json::json!({ "kind": "general_unknown" }));
        let msg = IpcMessage::response_err("7", err);

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["error"]["code"], -1004);
        assert_eq!(json["error"]["data"]["kind"], "general_unknown");
    }
}
