//! Turns the raw inputs of one invocation into a [`Message`].

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::message::{Article, Mentions, Message, MessageKind};
use crate::source::image_source;

/// What the caller handed us: a type, literal data and/or a file path.
#[derive(Debug, Clone)]
pub struct MessageInput {
    pub kind: MessageKind,
    pub data: Option<String>,
    pub file: Option<String>,
    pub mentions: Mentions,
}

impl MessageInput {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            data: None,
            file: None,
            mentions: Mentions::default(),
        }
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn mentions(mut self, mentions: Mentions) -> Self {
        self.mentions = mentions;
        self
    }

    fn literal(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }

    fn path(&self) -> Option<&str> {
        self.file.as_deref().filter(|f| !f.is_empty())
    }
}

/// Resolve `input` into a message, reading local files and fetching remote
/// images through `client` as needed.
pub async fn resolve(input: MessageInput, client: &reqwest::Client) -> Result<Message> {
    if input.literal().is_none() && input.path().is_none() {
        return Err(Error::Config(
            "message data or message file is required".to_string(),
        ));
    }

    match input.kind {
        MessageKind::Text => {
            let content = text_content(&input).await?;
            Ok(Message::text_with_mentions(content, input.mentions))
        }
        MessageKind::Markdown => Ok(Message::markdown(text_content(&input).await?)),
        MessageKind::Image => {
            let location = required_path(&input)?;
            let source = image_source(location, client).await;
            Ok(Message::image(source.fetch().await?))
        }
        MessageKind::News => {
            let path = Path::new(required_path(&input)?);
            let articles = read_articles(path).await?;
            Message::news(articles)
        }
    }
}

async fn text_content(input: &MessageInput) -> Result<String> {
    if let Some(data) = input.literal() {
        return Ok(data.to_string());
    }
    match input.path() {
        Some(path) => read_text_or_empty(Path::new(path)).await,
        None => Ok(String::new()),
    }
}

fn required_path(input: &MessageInput) -> Result<&str> {
    if input.literal().is_some() {
        warn!(kind = %input.kind, "literal data is ignored for this message type");
    }
    input.path().ok_or_else(|| {
        Error::Config(format!("{} messages must be given a file (-f)", input.kind))
    })
}

/// Read a UTF-8 file; a path that does not exist yields empty content.
pub async fn read_text_or_empty(path: &Path) -> Result<String> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "message file not found, using empty content");
        return Ok(String::new());
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse a YAML news document: either a bare list of articles or a mapping
/// with an `articles` list. Scalar fields may be written as numbers or booleans.
pub fn parse_articles(text: &str, origin: &Path) -> Result<Vec<Article>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Value = serde_yaml::from_str(text).map_err(|source| Error::NewsDocument {
        path: PathBuf::from(origin),
        source,
    })?;

    let records = match doc {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(records) => records,
        Value::Mapping(mut map) => match map.remove("articles") {
            Some(Value::Sequence(records)) => records,
            Some(Value::Null) => Vec::new(),
            _ => {
                return Err(Error::Validation(format!(
                    "{}: expected an `articles` list",
                    origin.display()
                )))
            }
        },
        _ => {
            return Err(Error::Validation(format!(
                "{}: expected a list of articles",
                origin.display()
            )))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            article_from_yaml(record).map_err(|reason| {
                Error::Validation(format!(
                    "{}: article #{} {reason}",
                    origin.display(),
                    idx + 1
                ))
            })
        })
        .collect()
}

fn article_from_yaml(record: Value) -> std::result::Result<Article, String> {
    let Value::Mapping(map) = record else {
        return Err("is not a mapping".to_string());
    };
    Ok(Article {
        title: scalar_field(&map, "title")?.unwrap_or_default(),
        description: scalar_field(&map, "description")?,
        url: scalar_field(&map, "url")?.unwrap_or_default(),
        picurl: scalar_field(&map, "picurl")?,
    })
}

/// Stringify a scalar field; `~` and absent fields are `None`.
fn scalar_field(map: &Mapping, name: &str) -> std::result::Result<Option<String>, String> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(format!("field `{name}` must be a string, number or boolean")),
    }
}

async fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let text = read_text_or_empty(path).await?;
    parse_articles(&text, path)
}
