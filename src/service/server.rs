use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};
use tokio::time::{Instant, sleep_until, timeout};

use crate::api::handlers;
use crate::api::{PageInfo, RouteTable};
use crate::error::ControllerError;
use crate::protocol::{REQUEST_BUDGET, request_path};
use crate::service::state::Controller;

/// Pending connections the kernel may queue while a request is serviced
pub const LISTEN_BACKLOG: u32 = 2;

pub const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Reads one request from a connection and writes one response
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    routes: RouteTable,
    page: PageInfo,
    read_timeout: Duration,
}

impl ConnectionHandler {
    pub fn new(routes: RouteTable, page: PageInfo, read_timeout: Duration) -> Self {
        Self {
            routes,
            page,
            read_timeout,
        }
    }

    pub async fn serve<S>(&self, stream: &mut S, ctl: &mut Controller) -> Result<(), ControllerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf = [0u8; REQUEST_BUDGET];
        let n = match timeout(self.read_timeout, stream.read(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => {
                tracing::debug!("No request data within {:?}", self.read_timeout);
                return Ok(());
            }
        };

        let path = request_path(&buf[..n]);
        let route = self.routes.resolve(path);
        let response = handlers::handle(route, ctl, &self.page).await;
        tracing::debug!(
            "{} -> {:?} ({})",
            String::from_utf8_lossy(path),
            route,
            response.status_code()
        );

        stream.write_all(&response.to_bytes()).await?;
        stream.flush().await?;

        Ok(())
    }
}

/// Single-connection-at-a-time control-plane server
pub struct ControlServer {
    listener: TcpListener,
    accept_timeout: Duration,
    handler: ConnectionHandler,
}

impl ControlServer {
    pub fn bind(
        addr: SocketAddr,
        accept_timeout: Duration,
        handler: ConnectionHandler,
    ) -> Result<Self, ControllerError> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;

        Ok(Self {
            listener,
            accept_timeout,
            handler,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ControllerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait up to the accept timeout for one connection and service it fully
    ///
    /// Returns whether a connection was accepted. Never fails: request
    /// errors are logged and the connection is closed.
    pub async fn poll(&self, ctl: &mut Controller) -> bool {
        let Some((mut stream, peer)) =
            accept_within(self.accept_timeout, self.listener.accept()).await
        else {
            return false;
        };

        tracing::debug!("Connection from {}", peer);

        if let Err(e) = self.handler.serve(&mut stream, ctl).await {
            tracing::warn!("HTTP error from {}: {}", peer, e);
        }

        let _ = stream.shutdown().await;
        true
    }
}

/// Resolve `accept` within `limit`
///
/// A failed accept still uses up the whole window so that a persistent
/// error (EMFILE and the like) cannot turn the loop into a busy spin.
async fn accept_within<F, T>(limit: Duration, accept: F) -> Option<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    let deadline = Instant::now() + limit;

    match timeout(limit, accept).await {
        Ok(Ok(accepted)) => Some(accepted),
        Ok(Err(e)) => {
            tracing::warn!("Accept failed: {}", e);
            sleep_until(deadline).await;
            None
        }
        Err(_) => {
            tracing::trace!("No connection this cycle");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use tokio::io::duplex;
    use tokio_test::io::Builder;

    use super::*;
    use crate::hardware::sim::{SimulatedOutput, SimulatedSensor};
    use crate::processing::calibration::Calibration;
    use crate::processing::sampling::{DEFAULT_SAMPLE_DELAY, Sampler};
    use crate::service::actuator::PumpDriver;
    use crate::service::state::Settings;

    fn controller(sensor: &SimulatedSensor) -> Controller {
        let pump = PumpDriver::new(Box::new(SimulatedOutput::new("relay")), None, false);
        let sampler = Sampler::new(Box::new(sensor.clone()), 16, DEFAULT_SAMPLE_DELAY);
        let settings = Settings {
            calibration: Calibration::new(44_000, 19_500),
            ..Settings::default()
        };
        Controller::new(settings, pump, sampler)
    }

    fn handler(routes: RouteTable) -> ConnectionHandler {
        ConnectionHandler::new(
            routes,
            PageInfo {
                ip: "127.0.0.1".into(),
                relay: "relay".into(),
                sensor: "simulated".into(),
            },
            DEFAULT_READ_TIMEOUT,
        )
    }

    async fn exchange(handler: &ConnectionHandler, ctl: &mut Controller, request: &[u8]) -> String {
        let (mut client, mut server) = duplex(64 * 1024);
        client.write_all(request).await.unwrap();

        handler.serve(&mut server, ctl).await.unwrap();
        drop(server);

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_over_stream() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::standard());

        let response = exchange(&handler, &mut ctl, b"GET /status HTTP/1.1\r\n\r\n").await;

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(r#"{"pump":false,"moisture":50,"threshold":35,"auto":false}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_threshold_over_stream() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::standard());

        let response = exchange(
            &handler,
            &mut ctl,
            b"GET /set_threshold?v=150 HTTP/1.1\r\nHost: x\r\n\r\n",
        )
        .await;

        assert_eq!(ctl.settings.threshold_percent, 100);
        assert!(response.contains("Content-Type: text/html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_request_reads_only_budget() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::standard());

        let mut request = b"GET /on HTTP/1.1\r\nX-Pad: ".to_vec();
        request.resize(4 * REQUEST_BUDGET, b'a');
        exchange(&handler, &mut ctl, &request).await;

        assert!(ctl.pump.is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_client_gets_no_response() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::standard());

        let (mut client, mut server) = duplex(1024);
        handler.serve(&mut server, &mut ctl).await.unwrap();
        drop(server);

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(sensor.reads(), 0);
    }

    #[tokio::test]
    async fn test_favicon_exact_bytes() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::access_point());

        let mut stream = Builder::new()
            .read(b"GET /favicon.ico HTTP/1.1\r\n\r\n")
            .write(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n")
            .build();

        handler.serve(&mut stream, &mut ctl).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_is_an_error() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let handler = handler(RouteTable::access_point());

        let mut stream = Builder::new()
            .read(b"GET /favicon.ico HTTP/1.1\r\n\r\n")
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "peer went away",
            ))
            .build();

        let result = handler.serve(&mut stream, &mut ctl).await;
        assert!(matches!(result, Err(ControllerError::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_waits_out_the_window() {
        let start = Instant::now();
        let accepted = accept_within(DEFAULT_ACCEPT_TIMEOUT, async {
            Err::<(), _>(std::io::Error::other("too many open files"))
        })
        .await;

        assert!(accepted.is_none());
        assert!(start.elapsed() >= DEFAULT_ACCEPT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_success_returns_immediately() {
        let start = Instant::now();
        let accepted = accept_within(DEFAULT_ACCEPT_TIMEOUT, async { Ok(7) }).await;

        assert_eq!(accepted, Some(7));
        assert!(start.elapsed() < DEFAULT_ACCEPT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_poll_times_out_without_client() {
        let sensor = SimulatedSensor::new(31_750);
        let mut ctl = controller(&sensor);
        let server = ControlServer::bind(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            Duration::from_millis(50),
            handler(RouteTable::standard()),
        )
        .unwrap();

        assert!(!server.poll(&mut ctl).await);
    }

    #[tokio::test]
    async fn test_poll_serves_real_client() {
        let sensor = SimulatedSensor::new(19_500);
        let mut ctl = controller(&sensor);
        let server = ControlServer::bind(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            DEFAULT_ACCEPT_TIMEOUT,
            handler(RouteTable::standard()),
        )
        .unwrap();
        let url = format!("http://{}/auto_on", server.local_addr().unwrap());

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let (accepted, response) = tokio::join!(server.poll(&mut ctl), async {
            let response = client.get(&url).send().await.unwrap();
            let status = response.status();
            (status, response.text().await.unwrap())
        });

        assert!(accepted);
        assert!(ctl.settings.auto_mode);
        assert_eq!(response.0, reqwest::StatusCode::OK);
        assert!(response.1.contains(">100%</b>"));
    }
}
