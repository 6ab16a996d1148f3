//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use reputation_explorer::config::ExplorerConfig;
use reputation_explorer::providers::{
    AddressInfo, LookupSource, ProviderResult, SocialIdentity, TokenBalance,
};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    /// Point every provider endpoint at this backend.
    pub fn config(&self) -> ExplorerConfig {
        let mut config = ExplorerConfig::default();
        config.providers.address_info.base_url = self.url("/addresses");
        config.providers.token_balances.base_url = self.url("/balances");
        config.providers.builder_score.base_url = self.url("/score");
        config.providers.socials.base_url = self.url("/socials");
        config.providers.farcaster.base_url = self.url("/farcaster/user/by_username");
        config.timeouts.request_secs = 5;
        config.pipeline.progress_tick_ms = 0;
        config
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `respond` maps each request to a status code and body.
pub async fn start_programmable_backend<F>(respond: F) -> MockBackend
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let respond = respond.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let (read_half, mut write_half) = socket.into_split();
                        let mut reader = BufReader::new(read_half);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                            return;
                        }
                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();

                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                                break;
                            }
                            let line = line.trim_end();
                            if line.is_empty() {
                                break;
                            }
                            if let Some((name, value)) = line.split_once(':') {
                                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                            }
                        }

                        let request = RecordedRequest { path, headers };
                        let (status, body) = respond(&request);
                        recorded.lock().unwrap().push(request);

                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = write_half.write_all(response.as_bytes()).await;
                        let _ = write_half.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

type Responder<T> = Box<dyn Fn(&str) -> ProviderResult<T> + Send + Sync>;

/// In-memory [`LookupSource`] recording every call.
pub struct StubSource {
    pub balances: Responder<Vec<TokenBalance>>,
    pub address: Responder<AddressInfo>,
    pub score: Responder<Option<i64>>,
    pub socials: Responder<Vec<SocialIdentity>>,
    pub farcaster: Responder<Option<SocialIdentity>>,
    /// Delay before every main-stage response.
    pub delay: Duration,
    pub farcaster_delay: Duration,
    pub calls: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl Default for StubSource {
    fn default() -> Self {
        Self {
            balances: Box::new(|_: &str| Ok(Vec::new())),
            address: Box::new(|_: &str| Ok(AddressInfo::default())),
            score: Box::new(|_: &str| Ok(Some(87))),
            socials: Box::new(|_: &str| Ok(Vec::new())),
            farcaster: Box::new(|_: &str| Ok(None)),
            delay: Duration::ZERO,
            farcaster_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl StubSource {
    fn record(&self, call: &'static str, subject: &str) {
        self.calls.lock().unwrap().push((call, subject.to_string()));
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Calls made so far, by name.
pub fn calls_named(calls: &Arc<Mutex<Vec<(&'static str, String)>>>, name: &str) -> usize {
    calls.lock().unwrap().iter().filter(|(c, _)| *c == name).count()
}

#[async_trait]
impl LookupSource for StubSource {
    async fn token_balances(&self, subject: &str) -> ProviderResult<Vec<TokenBalance>> {
        self.record("token_balances", subject);
        self.pause().await;
        (self.balances)(subject)
    }

    async fn address_info(&self, subject: &str) -> ProviderResult<AddressInfo> {
        self.record("address_info", subject);
        self.pause().await;
        (self.address)(subject)
    }

    async fn builder_score(&self, subject: &str) -> ProviderResult<Option<i64>> {
        self.record("builder_score", subject);
        self.pause().await;
        (self.score)(subject)
    }

    async fn socials(&self, subject: &str) -> ProviderResult<Vec<SocialIdentity>> {
        self.record("socials", subject);
        self.pause().await;
        (self.socials)(subject)
    }

    async fn farcaster_user(&self, username: &str) -> ProviderResult<Option<SocialIdentity>> {
        self.record("farcaster_user", username);
        if !self.farcaster_delay.is_zero() {
            tokio::time::sleep(self.farcaster_delay).await;
        }
        (self.farcaster)(username)
    }
}

pub fn balance(chain: &str, value_usd: f64) -> TokenBalance {
    TokenBalance {
        chain: chain.to_string(),
        amount: "1".to_string(),
        value_usd: Some(value_usd),
        ..TokenBalance::default()
    }
}

pub fn social(source: &str) -> SocialIdentity {
    SocialIdentity {
        source: source.to_string(),
        ..SocialIdentity::default()
    }
}
