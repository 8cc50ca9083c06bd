use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Upper bound on articles in a single news message.
pub const MAX_ARTICLES: usize = 8;

/// The four message types a group robot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MessageKind {
    Text,
    Markdown,
    Image,
    News,
}

impl MessageKind {
    /// Value of the top-level `msgtype` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Markdown => "markdown",
            MessageKind::Image => "image",
            MessageKind::News => "news",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "markdown" => Ok(MessageKind::Markdown),
            "image" => Ok(MessageKind::Image),
            "news" => Ok(MessageKind::News),
            other => Err(Error::Config(format!(
                "unknown message type '{other}' (expected text, markdown, image or news)"
            ))),
        }
    }
}

/// One news item. An empty `title` or `url` is a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picurl: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_picurl(mut self, picurl: impl Into<String>) -> Self {
        self.picurl = Some(picurl.into());
        self
    }
}

/// Users to notify along with a text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mentions {
    /// User ids; `@all` notifies everyone in the group.
    pub user_ids: Vec<String>,
    pub mobiles: Vec<String>,
}

impl Mentions {
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.mobiles.is_empty()
    }
}

/// A message ready to be turned into a webhook payload.
///
/// [`Message::news`] checks the article count and required fields up front;
/// payload construction repeats the check for values built by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text { content: String, mentions: Mentions },
    Markdown { content: String },
    Image { bytes: Vec<u8> },
    News { articles: Vec<Article> },
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Message::Text {
            content: content.into(),
            mentions: Mentions::default(),
        }
    }

    pub fn text_with_mentions(content: impl Into<String>, mentions: Mentions) -> Self {
        Message::Text {
            content: content.into(),
            mentions,
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Message::Markdown {
            content: content.into(),
        }
    }

    pub fn image(bytes: impl Into<Vec<u8>>) -> Self {
        Message::Image {
            bytes: bytes.into(),
        }
    }

    pub fn news(articles: Vec<Article>) -> Result<Self> {
        validate_articles(&articles)?;
        Ok(Message::News { articles })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Text { .. } => MessageKind::Text,
            Message::Markdown { .. } => MessageKind::Markdown,
            Message::Image { .. } => MessageKind::Image,
            Message::News { .. } => MessageKind::News,
        }
    }
}

pub(crate) fn validate_articles(articles: &[Article]) -> Result<()> {
    if articles.is_empty() || articles.len() > MAX_ARTICLES {
        return Err(Error::Validation(format!(
            "news messages need 1-{MAX_ARTICLES} articles, got {}",
            articles.len()
        )));
    }
    for (idx, article) in articles.iter().enumerate() {
        if article.title.is_empty() {
            return Err(Error::Validation(format!("article #{} has no title", idx + 1)));
        }
        if article.url.is_empty() {
            return Err(Error::Validation(format!("article #{} has no url", idx + 1)));
        }
    }
    Ok(())
}
