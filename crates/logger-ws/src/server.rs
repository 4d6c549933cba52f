//! HTTP endpoint that upgrades to a log stream

use crate::{Error, Result, WebSocketConnection};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use fanlog::Logger;
use parking_lot::Mutex;
use std::future::IntoFuture;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

/// Path the stream is served on.
pub const LOG_PATH: &str = "/log";

/// Port the stream is served on by default.
pub const DEFAULT_PORT: u16 = 6564;

/// Default listen address: every interface, [`DEFAULT_PORT`].
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT);

/// A router serving `GET /log`.
///
/// Each upgraded websocket becomes `logger`'s streaming subscriber,
/// replacing (and closing) the previous one. Mount it into an existing axum
/// server or run it with [`LogStreamServer`].
pub fn router<L>(logger: L) -> Router
where
    L: AsRef<Logger> + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(LOG_PATH, get(subscribe::<L>))
        .with_state(logger)
}

async fn subscribe<L>(State(logger): State<L>, ws: WebSocketUpgrade) -> Response
where
    L: AsRef<Logger> + Clone + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| async move {
        let (connection, forwarder) = WebSocketConnection::new(socket);
        logger.as_ref().set_network_connection(connection);
        info!("Log subscriber connected");

        forwarder.run().await;
        debug!("Log subscriber finished");
    })
}

/// Standalone server for the log stream.
pub struct LogStreamServer {
    local_addr: SocketAddr,
    listener: Mutex<Option<TcpListener>>,
    router: Router,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl LogStreamServer {
    /// Bind `listen_addr` for `logger`'s stream. Nothing is served until
    /// [`LogStreamServer::start`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Bind` if the address cannot be bound.
    pub async fn bind<L>(listen_addr: SocketAddr, logger: L) -> Result<Self>
    where
        L: AsRef<Logger> + Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|source| Error::Bind {
                addr: listen_addr,
                source,
            })?;
        let local_addr = listener.local_addr().map_err(Error::LocalAddr)?;

        Ok(Self {
            local_addr,
            listener: Mutex::new(Some(listener)),
            router: router(logger),
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        })
    }

    /// Address actually bound, with the port resolved.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start serving in the background.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyStarted` on a second call.
    pub fn start(&self) -> Result<JoinHandle<()>> {
        let listener = self.listener.lock().take().ok_or(Error::AlreadyStarted)?;
        let router = self.router.clone();
        let shutdown_token = self.shutdown_token.clone();

        info!("log stream listening on {}{}", self.local_addr, LOG_PATH);

        let handle = self.task_tracker.spawn(async move {
            tokio::select! {
                e = axum::serve(listener, router.into_make_service()).into_future() => {
                    info!("log stream server exited {:?}", e);
                }
                () = shutdown_token.cancelled() => {}
            };
        });

        self.task_tracker.close();

        Ok(handle)
    }

    /// Stop serving and wait for the server task to finish.
    pub async fn shutdown(&self) {
        info!("log stream server shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.wait().await;

        info!("log stream server shutdown");
    }
}
