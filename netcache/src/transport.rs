use crate::FetchError;
use async_trait::async_trait;
use log::debug;

/// Byte-oriented access to remote resources.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    async fn post(&self, url: &str, body: String) -> Result<Vec<u8>, FetchError>;
}

/// [`Transport`] over HTTP(S).
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        body(url, response).await
    }

    async fn post(&self, url: &str, body_text: String) -> Result<Vec<u8>, FetchError> {
        debug!("POST {url} ({} bytes)", body_text.len());
        let response = self.client.post(url).body(body_text).send().await?;
        body(url, response).await
    }
}

async fn body(url: &str, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}
