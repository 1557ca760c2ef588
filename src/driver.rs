// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Driver entry points.
//!
//! A [`Driver`] opens connections from a [`Config`]. A [`Connector`] pairs a
//! driver with a configuration and opens any number of connections from it.

use crate::client::{RestClient, SnowflakeHttpClient};
use crate::config::Config;
use crate::connection::Connection;
use crate::error::Result;
use crate::logging::init_logging;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Capability to open connections.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Open a connection with a complete configuration.
    async fn open_with_config(&self, config: Config) -> Result<Connection>;
}

/// Driver talking to the service over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnowflakeDriver;

impl SnowflakeDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for SnowflakeDriver {
    async fn open_with_config(&self, mut config: Config) -> Result<Connection> {
        init_logging(&config.log);
        config.fill_missing_parameters()?;

        let endpoint = config.endpoint();
        debug!("Opening connection to {}", endpoint);

        let http_client = Arc::new(SnowflakeHttpClient::new(config.http.clone())?);
        let client = Arc::new(RestClient::new(http_client, endpoint));
        Ok(Connection::with_client(config, client))
    }
}

/// A driver plus the configuration to open connections with.
#[derive(Debug, Clone)]
pub struct Connector<D: Driver> {
    driver: D,
    config: Config,
}

impl<D: Driver> Connector<D> {
    pub fn new(driver: D, config: Config) -> Self {
        Self { driver, config }
    }

    /// Open a new connection. Missing protocol, port and host are filled in
    /// on a copy of the configuration.
    pub async fn connect(&self) -> Result<Connection> {
        let mut config = self.config.clone();
        config.fill_missing_parameters()?;
        self.driver.open_with_config(config).await
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SnowflakeClient;
    use crate::error::Error;
    use crate::types::query::{ChunkMeta, ExecResponse, QueryRequest, RawRow};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug)]
    struct UnreachableClient;

    #[async_trait]
    impl SnowflakeClient for UnreachableClient {
        async fn post_query(&self, _: &QueryRequest, _: Duration) -> Result<ExecResponse> {
            Err(Error::transport("unreachable"))
        }

        async fn fetch_chunk(
            &self,
            _: &ChunkMeta,
            _: &HashMap<String, String>,
        ) -> Result<Vec<RawRow>> {
            Err(Error::transport("unreachable"))
        }
    }

    /// Records the configurations it was asked to open.
    #[derive(Debug, Default)]
    struct RecordingDriver {
        opened: Mutex<Vec<Config>>,
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn open_with_config(&self, config: Config) -> Result<Connection> {
            self.opened.lock().unwrap().push(config.clone());
            Ok(Connection::with_client(config, Arc::new(UnreachableClient)))
        }
    }

    #[tokio::test]
    async fn test_connector_fills_missing_parameters() {
        let mut config = Config::default();
        config.account = Some("acme".to_string());
        let connector = Connector::new(RecordingDriver::default(), config);

        let connection = connector.connect().await.unwrap();
        assert!(!connection.is_closed());

        let opened = connector.driver().opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].endpoint(), "https://acme.snowflakecomputing.com:443");
        // the connector's own configuration is left untouched
        assert!(connector.config().host.is_none());
    }

    #[tokio::test]
    async fn test_connector_requires_host_or_account() {
        let connector = Connector::new(RecordingDriver::default(), Config::default());
        assert!(matches!(
            connector.connect().await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(connector.driver().opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snowflake_driver_opens_without_network() {
        let mut config = Config::default();
        config.host = Some("localhost".to_string());
        config.protocol = Some("http".to_string());
        config.port = Some(8080);
        config.log.level = Some("off".to_string());

        let connection = SnowflakeDriver::new().open_with_config(config).await.unwrap();
        assert_eq!(connection.config().endpoint(), "http://localhost:8080");
        assert_eq!(connection.sequence_counter(), 0);
    }
}
