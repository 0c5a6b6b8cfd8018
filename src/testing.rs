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

//! In-memory backend for tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::access::DataAccess;
use crate::api::{Backend, Query};
use crate::config::AppwriteConfig;
use crate::error::{AppwriteError, AppwriteResult};
use crate::models::{Account, DocumentList, PreviewOptions, Session, StoredFile, UploadAsset};

/// Holds a search request until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
struct State {
    accounts: Vec<(Account, String)>,
    session: Option<Session>,
    collections: HashMap<String, Vec<Value>>,
    files: Vec<StoredFile>,
    sequence: i64,
    calls: Vec<&'static str>,
    failing_collections: HashSet<String>,
    failing_reads: HashSet<String>,
    fail_uploads: bool,
    blank_account_ids: bool,
}

/// Backend double that keeps documents in memory and evaluates queries
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data access over this backend with the default configuration
    pub fn access(self: &Arc<Self>) -> DataAccess<FakeBackend> {
        DataAccess::new(Arc::clone(self), Arc::new(AppwriteConfig::default()))
    }

    /// Insert a document directly, as if another client had created it
    pub fn seed(&self, collection_id: &str, document: Value) -> Value {
        let mut state = self.state.lock().unwrap();
        let doc = stamp(&mut state, document, None);
        state
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.clone());
        doc
    }

    pub fn documents(&self, collection_id: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.collections.get(collection_id).cloned().unwrap_or_default()
    }

    pub fn accounts(&self) -> Vec<Account> {
        let state = self.state.lock().unwrap();
        state.accounts.iter().map(|(a, _)| a.clone()).collect()
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.lock().unwrap().session.clone()
    }

    /// Names of the remote calls made so far
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fail_writes_to(&self, collection_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_collections.insert(collection_id.to_string());
    }

    pub fn fail_reads_from(&self, collection_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_reads.insert(collection_id.to_string());
    }

    /// Make account creation answer without an `$id`
    pub fn return_blank_account_ids(&self) {
        self.state.lock().unwrap().blank_account_ids = true;
    }

    pub fn fail_uploads(&self) {
        self.state.lock().unwrap().fail_uploads = true;
    }

    /// Block searches for `query` until the returned gate is released
    pub fn hold_search(&self, query: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::clone(&gate));
        gate
    }

    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn unauthorized() -> AppwriteError {
    AppwriteError::Api {
        status: 401,
        code: 401,
        kind: "general_unauthorized_scope".to_string(),
        message: "User (role: guests) missing scope (account)".to_string(),
    }
}

fn server_error(message: &str) -> AppwriteError {
    AppwriteError::Api {
        status: 500,
        code: 500,
        kind: "general_unknown".to_string(),
        message: message.to_string(),
    }
}

/// Give a document its system attributes
fn stamp(state: &mut State, mut document: Value, id: Option<&str>) -> Value {
    state.sequence += 1;
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        + Duration::seconds(state.sequence);

    if let Some(map) = document.as_object_mut() {
        if let Some(id) = id {
            map.insert("$id".to_string(), json!(id));
        }
        map.entry("$id")
            .or_insert_with(|| json!(format!("doc{}", state.sequence)));
        map.entry("$createdAt")
            .or_insert_with(|| json!(created.to_rfc3339()));
    }
    document
}

fn field_matches(field: &Value, wanted: &Value) -> bool {
    match field {
        Value::Object(map) => map.get("$id") == Some(wanted),
        other => other == wanted,
    }
}

fn text_matches(field: &Value, needle: &str) -> bool {
    let haystack = field.as_str().unwrap_or_default().to_lowercase();
    needle
        .to_lowercase()
        .split_whitespace()
        .any(|word| haystack.contains(word))
}

fn sort_key(doc: &Value, attribute: &str) -> String {
    doc.get(attribute)
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .unwrap_or_default()
}

fn evaluate(mut docs: Vec<Value>, queries: &[Query]) -> Vec<Value> {
    for query in queries {
        match query {
            Query::Equal { attribute, values } => docs.retain(|doc| {
                doc.get(attribute)
                    .map(|field| values.iter().any(|v| field_matches(field, v)))
                    .unwrap_or(false)
            }),
            Query::Search { attribute, value } => docs.retain(|doc| {
                doc.get(attribute)
                    .map(|field| text_matches(field, value))
                    .unwrap_or(false)
            }),
            _ => {}
        }
    }

    for query in queries {
        match query {
            Query::OrderDesc(attribute) => {
                docs.sort_by(|a, b| sort_key(b, attribute).cmp(&sort_key(a, attribute)))
            }
            _ => {}
        }
    }

    for query in queries {
        if let Query::CursorAfter(id) = query {
            if let Some(pos) = docs.iter().position(|d| d["$id"] == json!(id)) {
                docs.drain(..=pos);
            }
        }
    }

    for query in queries {
        if let Query::Limit(limit) = query {
            docs.truncate(*limit as usize);
        }
    }

    docs
}

#[async_trait]
impl Backend for FakeBackend {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppwriteResult<Account> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("account.create");

        if state.accounts.iter().any(|(a, _)| a.email == email) {
            return Err(AppwriteError::Api {
                status: 409,
                code: 409,
                kind: "user_already_exists".to_string(),
                message: "A user with the same id, email, or phone already exists".to_string(),
            });
        }

        let account = Account {
            id: if state.blank_account_ids {
                String::new()
            } else {
                user_id.to_string()
            },
            created_at: None,
            email: email.to_string(),
            name: name.to_string(),
        };
        state.accounts.push((account.clone(), password.to_string()));
        Ok(account)
    }

    async fn create_email_session(&self, email: &str, password: &str) -> AppwriteResult<Session> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("account.createEmailPasswordSession");

        let account = state
            .accounts
            .iter()
            .find(|(a, p)| a.email == email && p == password)
            .map(|(a, _)| a.clone())
            .ok_or_else(|| AppwriteError::Api {
                status: 401,
                code: 401,
                kind: "user_invalid_credentials".to_string(),
                message: "Invalid credentials. Please check the email and password.".to_string(),
            })?;

        state.sequence += 1;
        let session = Session {
            id: format!("sess{}", state.sequence),
            created_at: None,
            user_id: account.id,
            expire: None,
            provider: "email".to_string(),
            current: true,
        };
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn get_current_session(&self) -> AppwriteResult<Session> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("account.getSession");
        state.session.clone().ok_or_else(unauthorized)
    }

    async fn delete_current_session(&self) -> AppwriteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("account.deleteSession");
        state.session.take().map(|_| ()).ok_or_else(unauthorized)
    }

    async fn get_account(&self) -> AppwriteResult<Account> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("account.get");

        let user_id = state.session.as_ref().map(|s| s.user_id.clone()).ok_or_else(unauthorized)?;
        state
            .accounts
            .iter()
            .find(|(a, _)| a.id == user_id)
            .map(|(a, _)| a.clone())
            .ok_or_else(unauthorized)
    }

    async fn list_documents(
        &self,
        _database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> AppwriteResult<DocumentList<Value>> {
        self.record("databases.listDocuments");

        let gate = queries.iter().find_map(|q| match q {
            Query::Search { value, .. } => self.gates.lock().unwrap().get(value).cloned(),
            _ => None,
        });
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let state = self.state.lock().unwrap();
        if state.failing_reads.contains(collection_id) {
            return Err(server_error("Collection unavailable"));
        }
        let docs = state.collections.get(collection_id).cloned().unwrap_or_default();
        let total = evaluate(docs.clone(), &queries
            .iter()
            .filter(|q| !matches!(q, Query::Limit(_) | Query::CursorAfter(_)))
            .cloned()
            .collect::<Vec<_>>())
        .len() as u64;

        // Expand relationships the way Appwrite loads them
        let profiles: Vec<Value> = state.collections.values().flatten().cloned().collect();
        let documents = evaluate(docs, queries)
            .into_iter()
            .map(|mut doc| {
                if let Some(id) = doc.get("creator").and_then(Value::as_str).map(str::to_string) {
                    if let Some(profile) = profiles.iter().find(|p| p["$id"] == json!(id)) {
                        doc["creator"] = profile.clone();
                    }
                }
                doc
            })
            .collect();

        Ok(DocumentList { total, documents })
    }

    async fn create_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> AppwriteResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("databases.createDocument");

        if state.failing_collections.contains(collection_id) {
            return Err(server_error("Document write rejected"));
        }

        let doc = stamp(&mut state, data, Some(document_id));
        state
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        asset: &UploadAsset,
    ) -> AppwriteResult<StoredFile> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("storage.createFile");

        if state.fail_uploads {
            return Err(server_error("Storage unavailable"));
        }

        let file = StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            name: asset.name.clone(),
            mime_type: asset.mime_type.clone().unwrap_or_default(),
            size: asset.size.unwrap_or_default(),
        };
        state.files.push(file.clone());
        Ok(file)
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> AppwriteResult<String> {
        Ok(format!("fake://{}/{}/view", bucket_id, file_id))
    }

    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> AppwriteResult<String> {
        Ok(format!(
            "fake://{}/{}/preview?width={}&height={}&gravity={}&quality={}",
            bucket_id,
            file_id,
            options.width,
            options.height,
            options.gravity.as_str(),
            options.quality
        ))
    }

    fn initials_avatar_url(&self, name: &str) -> AppwriteResult<String> {
        Ok(format!("fake://avatars/initials?name={}", name))
    }
}
