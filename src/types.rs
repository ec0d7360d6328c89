pub use crate::utils::database;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core::time::Duration;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Clone)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct StorageContext {
    pub api_key: String,
    pub api_secret: String,
    pub upload_endpoint: String,
    pub serve_endpoint: String,
}

#[derive(Clone)]
pub struct MailContext {
    pub api_endpoint: String,
    pub api_key: String,
    pub domain: String,
    pub sender_name: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub storage: StorageContext,
    pub mail: MailContext,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub api_key: String,
    pub api_secret: String,
    pub upload_endpoint: String,
    pub serve_endpoint: String,
}

#[derive(Clone)]
pub struct MailConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub domain: String,
    pub sender_name: String,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");
        let url = env::var("URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let storage_api_key = env::var("STORAGE_API_KEY").expect("STORAGE_API_KEY not set");
        let storage_api_secret =
            env::var("STORAGE_API_SECRET").expect("STORAGE_API_SECRET not set");
        let storage_upload_endpoint =
            env::var("STORAGE_UPLOAD_ENDPOINT").expect("STORAGE_UPLOAD_ENDPOINT not set");
        let storage_serve_endpoint =
            env::var("STORAGE_SERVE_ENDPOINT").expect("STORAGE_SERVE_ENDPOINT not set");
        let mail_api_endpoint = env::var("MAIL_API_ENDPOINT").expect("MAIL_API_ENDPOINT not set");
        let mail_api_key = env::var("MAIL_API_KEY").expect("MAIL_API_KEY not set");
        let mail_domain = env::var("MAIL_DOMAIN").expect("MAIL_DOMAIN not set");
        let mail_sender_name =
            env::var("MAIL_SENDER_NAME").unwrap_or_else(|_| "NomNom Eats".to_string());

        Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            storage: StorageConfig {
                api_key: storage_api_key,
                api_secret: storage_api_secret,
                upload_endpoint: storage_upload_endpoint,
                serve_endpoint: storage_serve_endpoint,
            },
            mail: MailConfig {
                api_endpoint: mail_api_endpoint,
                api_key: mail_api_key,
                domain: mail_domain,
                sender_name: mail_sender_name,
            },
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(db_conn.clone()).await;

        Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            db_conn,
            storage: StorageContext {
                api_key: self.storage.api_key,
                api_secret: self.storage.api_secret,
                upload_endpoint: self.storage.upload_endpoint,
                serve_endpoint: self.storage.serve_endpoint,
            },
            mail: MailContext {
                api_endpoint: self.mail.api_endpoint,
                api_key: self.mail.api_key,
                domain: self.mail.domain,
                sender_name: self.mail.sender_name,
            },
        }
    }
}

/// A cron tick delivered to a scheduled worker.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tick(DateTime<Utc>);

impl apalis::prelude::Job for Tick {
    const NAME: &'static str = "nomnom::Tick";
}

impl From<DateTime<Utc>> for Tick {
    fn from(t: DateTime<Utc>) -> Self {
        Self(t)
    }
}

/// In-memory backend the cron workers hang off; the actual tick source is
/// the cron stream, this just satisfies the worker's storage bound.
#[derive(Clone)]
pub struct TickStorage {
    controller: apalis::prelude::Controller,
    inner: apalis::prelude::MemoryWrapper<Tick>,
    ticks: Vec<Tick>,
}

impl TickStorage {
    pub fn new() -> Self {
        Self {
            controller: apalis::prelude::Controller::new(),
            inner: apalis::prelude::MemoryWrapper::<Tick>::new(),
            ticks: vec![],
        }
    }
}

impl apalis::prelude::Backend<apalis::prelude::Request<Tick>> for TickStorage {
    type Stream = apalis::prelude::BackendStream<
        apalis::prelude::RequestStream<apalis::prelude::Request<Tick>>,
    >;

    type Layer = tower::ServiceBuilder<tower::layer::util::Identity>;

    fn common_layer(&self, _worker: apalis::prelude::WorkerId) -> Self::Layer {
        tower::ServiceBuilder::new()
    }

    fn poll(self, _worker: apalis::prelude::WorkerId) -> apalis::prelude::Poller<Self::Stream> {
        let stream = self
            .inner
            .map(|r| Ok(Some(apalis::prelude::Request::new(r))))
            .boxed();
        apalis::prelude::Poller::new(
            apalis::prelude::BackendStream::new(stream, self.controller),
            async {},
        )
    }
}

impl apalis::prelude::Storage for TickStorage {
    type Job = Tick;

    type Error = apalis::prelude::Error;

    type Identifier = usize;

    async fn push(&mut self, tick: Self::Job) -> Result<Self::Identifier, Self::Error> {
        self.ticks.push(tick);
        Ok(self.ticks.len())
    }

    async fn schedule(
        &mut self,
        _tick: Self::Job,
        _on: i64,
    ) -> Result<Self::Identifier, Self::Error> {
        unimplemented!("ticks are sourced from the cron stream")
    }

    async fn len(&self) -> Result<i64, Self::Error> {
        Ok(self.ticks.len() as i64)
    }

    async fn fetch_by_id(
        &self,
        _tick_id: &Self::Identifier,
    ) -> Result<Option<apalis::prelude::Request<Self::Job>>, Self::Error> {
        unimplemented!("ticks are sourced from the cron stream")
    }

    async fn update(&self, _tick: apalis::prelude::Request<Self::Job>) -> Result<(), Self::Error> {
        unimplemented!("ticks are sourced from the cron stream")
    }

    async fn reschedule(
        &mut self,
        _tick: apalis::prelude::Request<Self::Job>,
        _wait: Duration,
    ) -> Result<(), Self::Error> {
        unimplemented!("ticks are sourced from the cron stream")
    }

    async fn is_empty(&self) -> Result<bool, Self::Error> {
        Ok(self.ticks.is_empty())
    }

    async fn vacuum(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

/// A recurring task registered with the process-wide job monitor at startup.
pub struct SchedulableJob {
    pub schedule: apalis::cron::Schedule,
    pub job: Arc<
        dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), apalis::prelude::Error>> + Send>>
            + Send
            + Sync,
    >,
}
