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

//! Aora Core - Rust backend for the Aora short-video client
//!
//! This binary runs as a background process next to the mobile UI host. It
//! owns the Appwrite data-access layer and the search screen state, and it
//! talks to the host over a line-delimited JSON IPC channel.

mod access;
mod api;
mod config;
mod error;
mod ipc;
mod logger;
mod models;
mod screens;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::access::DataAccess;
use crate::api::AppwriteClient;
use crate::config::AppConfig;
use crate::ipc::MessageHandler;
use crate::logger::{Logger, LoggerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging system
    Logger::init_with_config(LoggerConfig::from_settings(&config.logging)?)?;

    info!("Aora Core starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let client = AppwriteClient::new(&config.appwrite).context("Failed to build Appwrite client")?;
    info!("Using Appwrite endpoint {}", client.endpoint());

    let access = DataAccess::new(Arc::new(client), Arc::new(config.appwrite.clone()));
    let handler = Arc::new(MessageHandler::new(access));

    match ipc::server::run_server(handler, &config.ipc).await {
        Ok(_) => {
            info!("Aora Core shutting down gracefully");
        }
        Err(e) => {
            error!("Fatal error in IPC server: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
