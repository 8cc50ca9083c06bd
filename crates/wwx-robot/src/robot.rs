use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RobotSettings;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::payload::Payload;
use crate::resolve::{resolve, MessageInput};

const SEND_PATH: &str = "/cgi-bin/webhook/send";

/// Reply body of the `send` endpoint.
#[derive(Debug, Deserialize)]
struct SendReply {
    errcode: Option<i64>,
    errmsg: Option<String>,
}

/// A group robot addressed by its webhook key.
#[derive(Debug, Clone)]
pub struct Robot {
    url: Url,
    client: Client,
}

impl Robot {
    pub fn new(settings: &RobotSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = &settings.proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("building HTTP client: {e}")))?;

        let base = settings.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{SEND_PATH}"))
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {e}", settings.endpoint)))?;
        url.query_pairs_mut().append_pair("key", &settings.key);

        Ok(Self { url, client })
    }

    /// Full webhook URL, key included.
    pub fn webhook_url(&self) -> &Url {
        &self.url
    }

    /// The HTTP client used by this robot; remote image fetches share it (and its proxy).
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Resolve `input` and send the result in one go.
    pub async fn send_input(&self, input: MessageInput) -> Result<Message> {
        let message = resolve(input, &self.client).await?;
        self.send(&message).await?;
        Ok(message)
    }

    /// POST `message` once. Succeeds only on HTTP 200 with `errmsg == "ok"`.
    pub async fn send(&self, message: &Message) -> Result<()> {
        let payload = Payload::from_message(message)?;
        debug!(
            host = self.url.host_str().unwrap_or_default(),
            msgtype = %message.kind(),
            "sending webhook message"
        );

        let resp = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let reply = serde_json::from_str::<SendReply>(&text).ok();
        let (errcode, errmsg) = match reply {
            Some(r) => (r.errcode, r.errmsg),
            None => (None, None),
        };

        if status != StatusCode::OK || errmsg.as_deref() != Some("ok") {
            debug!(status = status.as_u16(), body = %text, "webhook rejected message");
            return Err(Error::Rejected {
                status: status.as_u16(),
                errcode,
                errmsg,
            });
        }

        info!(msgtype = %message.kind(), "message delivered");
        Ok(())
    }
}
