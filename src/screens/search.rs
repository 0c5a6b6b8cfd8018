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

//! Search results screen
//!
//! Binds the query from navigation state to a post search and produces the
//! view the UI host renders. Every request is tagged with a generation
//! number; a response that arrives after a newer query was issued is
//! dropped, so the displayed results always belong to the latest query.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::access::DataAccess;
use crate::api::Backend;
use crate::log_search;
use crate::models::Post;

pub const HEADER_LABEL: &str = "Search result";
pub const EMPTY_TITLE: &str = "No Videos Found";
pub const EMPTY_SUBTITLE: &str = "No Videos Found for this search !";

/// Everything the search screen shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchView {
    pub header: SearchHeader,
    pub body: SearchBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHeader {
    pub label: String,
    pub query: String,
    /// Initial value of the search input
    pub input_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchBody {
    Loading,
    Results { cards: Vec<VideoCard> },
    Empty(EmptyState),
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmptyState {
    pub title: String,
    pub subtitle: String,
}

impl EmptyState {
    pub fn no_videos() -> Self {
        Self {
            title: EMPTY_TITLE.to_string(),
            subtitle: EMPTY_SUBTITLE.to_string(),
        }
    }
}

/// One result row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoCard {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub video: Option<String>,
    pub creator: Option<String>,
    pub avatar: Option<String>,
}

impl From<Post> for VideoCard {
    fn from(post: Post) -> Self {
        let creator = post
            .creator
            .as_ref()
            .and_then(|c| c.username())
            .map(str::to_string);
        let avatar = post
            .creator
            .as_ref()
            .and_then(|c| c.avatar())
            .map(str::to_string);

        Self {
            id: post.id,
            title: post.title,
            thumbnail: post.thumbnail,
            video: post.video,
            creator,
            avatar,
        }
    }
}

/// Result of one search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response was for the latest query and is now on screen
    Applied(SearchView),
    /// A newer query was issued while this one was in flight
    Stale { generation: u64, query: String },
}

struct SearchState {
    generation: u64,
    query: String,
    body: SearchBody,
}

impl SearchState {
    fn render(&self) -> SearchView {
        SearchView {
            header: SearchHeader {
                label: HEADER_LABEL.to_string(),
                query: self.query.clone(),
                input_value: self.query.clone(),
            },
            body: self.body.clone(),
        }
    }
}

/// Search screen state
pub struct SearchScreen<B: Backend> {
    access: DataAccess<B>,
    state: Mutex<SearchState>,
}

impl<B: Backend> SearchScreen<B> {
    pub fn new(access: DataAccess<B>) -> Self {
        Self {
            access,
            state: Mutex::new(SearchState {
                generation: 0,
                query: String::new(),
                body: SearchBody::Loading,
            }),
        }
    }

    /// Screen mounted with `query` from navigation state
    pub async fn open(&self, query: &str) -> SearchOutcome {
        debug!("Search screen opened for '{}'", query);
        self.set_query(query).await
    }

    /// Query changed; issue a fresh search
    pub async fn set_query(&self, query: &str) -> SearchOutcome {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.query = query.to_string();
            state.body = SearchBody::Loading;
            state.generation
        };
        log_search!(issued, query, generation);

        let result = self.access.search_posts(query).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            log_search!(stale, query, generation, state.generation);
            return SearchOutcome::Stale {
                generation,
                query: query.to_string(),
            };
        }

        state.body = match result {
            Ok(posts) if posts.is_empty() => SearchBody::Empty(EmptyState::no_videos()),
            Ok(posts) => SearchBody::Results {
                cards: posts.into_iter().map(VideoCard::from).collect(),
            },
            Err(e) => SearchBody::Failed {
                message: e.to_string(),
            },
        };
        log_search!(applied, query, generation);

        SearchOutcome::Applied(state.render())
    }

    /// Current view
    pub async fn view(&self) -> SearchView {
        self.state.lock().await.render()
    }
}
