//! HTTP server for the admin dashboard, open-house and landing pages.

pub mod error;
pub mod health;
pub mod router;
pub mod shutdown;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::leads::LeadForwarder;
use crate::notify::{ForwardError, NotificationDispatcher};
use crate::rsvp::RsvpStore;
use crate::server::router::{build_router, AppState};
use crate::server::shutdown::ShutdownManager;
use crate::settings::{Settings, SettingsError};
use crate::site::ModuleStore;
use crate::update::UpdateService;

pub use error::{ApiError, MessageBody};
pub use router::UpdateRequest;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Webhook(#[from] ForwardError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("bind() must be called before run()")]
    NotBound,

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub struct AppServer {
    pub addr: SocketAddr,
    /// The bound listener. Populated by bind(), consumed by run().
    listener: Option<TcpListener>,
    state: AppState,
    max_concurrent_requests: usize,
    shutdown: Arc<ShutdownManager>,
}

impl AppServer {
    /// Build the server from settings.
    ///
    /// Must be called inside a tokio runtime: the notification worker is
    /// spawned here.
    pub fn new(settings: &Settings) -> Result<Self, ServerError> {
        let addr = settings.bind_addr()?;
        let notifier = NotificationDispatcher::spawn(&settings.notify)?;
        let store = ModuleStore::new(settings.store.module_path.clone());
        let state = AppState {
            updates: UpdateService::new(store, notifier),
            rsvps: RsvpStore::new(),
            leads: LeadForwarder::new(&settings.leads)?,
        };

        Ok(Self {
            addr,
            listener: None,
            state,
            max_concurrent_requests: settings.server.max_concurrent_requests,
            shutdown: Arc::new(ShutdownManager::new()),
        })
    }

    /// Bind the configured address. Returns the actual address (port 0
    /// resolves to an ephemeral port).
    pub async fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: self.addr,
                source: e,
            })?;
        let actual = listener.local_addr().map_err(|e| ServerError::Bind {
            addr: self.addr,
            source: e,
        })?;
        self.addr = actual;
        self.listener = Some(listener);
        tracing::info!("Server bound to {}", actual);
        Ok(actual)
    }

    pub fn shutdown_handle(&self) -> Arc<ShutdownManager> {
        self.shutdown.clone()
    }

    /// Serve until shutdown is signaled.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = self.listener.ok_or(ServerError::NotBound)?;

        tracing::info!(
            module = %self.state.updates.store().path().display(),
            "Starting server on {}",
            self.addr
        );

        let app = build_router(self.state, self.max_concurrent_requests);
        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = shutdown.wait_for_shutdown().await {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                }
            })
            .into_future()
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
