//! Test server wrapper that starts murmur on a random port

use std::net::SocketAddr;

use murmur_config::Config;
use murmur_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(&config)?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Upload `audio` as the `audio` part of a multipart form
    pub async fn try_upload(&self, audio: Vec<u8>) -> reqwest::Result<reqwest::Response> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("sample.wav")
            .mime_str("audio/wav")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("audio", part);

        self.client
            .post(self.url("/api/speech-to-text"))
            .multipart(form)
            .send()
            .await
    }

    /// Upload `audio` and expect the server to answer
    pub async fn upload(&self, audio: Vec<u8>) -> reqwest::Response {
        self.try_upload(audio).await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
