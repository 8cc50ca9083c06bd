//! JSON bodies accepted by the webhook `send` endpoint.
//!
//! Every body carries a `msgtype` tag and a nested object named after it:
//!
//! ```json
//! {"msgtype":"text","text":{"content":"Hello world"}}
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::Result;
use crate::message::{validate_articles, Article, Message};

#[derive(Debug, Serialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum Payload<'a> {
    Text { text: TextPayload<'a> },
    Markdown { markdown: ContentPayload<'a> },
    Image { image: ImagePayload },
    News { news: NewsPayload<'a> },
}

#[derive(Debug, Serialize)]
pub struct TextPayload<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    pub mentioned_list: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    pub mentioned_mobile_list: &'a [String],
}

fn is_empty(list: &&[String]) -> bool {
    list.is_empty()
}

#[derive(Debug, Serialize)]
pub struct ContentPayload<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    pub base64: String,
    pub md5: String,
}

impl ImagePayload {
    /// Encodes and digests the same raw bytes; nothing is transcoded in between.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
            md5: hex::encode(Md5::digest(bytes)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsPayload<'a> {
    pub articles: &'a [Article],
}

impl<'a> Payload<'a> {
    pub fn from_message(message: &'a Message) -> Result<Self> {
        let payload = match message {
            Message::Text { content, mentions } => Payload::Text {
                text: TextPayload {
                    content,
                    mentioned_list: &mentions.user_ids,
                    mentioned_mobile_list: &mentions.mobiles,
                },
            },
            Message::Markdown { content } => Payload::Markdown {
                markdown: ContentPayload { content },
            },
            Message::Image { bytes } => Payload::Image {
                image: ImagePayload::from_bytes(bytes),
            },
            Message::News { articles } => {
                validate_articles(articles)?;
                Payload::News {
                    news: NewsPayload { articles },
                }
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Mentions;
    use assert_matches::assert_matches;
    use serde_json::{json, Value};

    fn body(message: &Message) -> Value {
        let text = serde_json::to_string(&Payload::from_message(message).unwrap()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn text_body_matches_wire_format() {
        let value = body(&Message::text("Hello world"));
        assert_eq!(
            value,
            json!({"msgtype": "text", "text": {"content": "Hello world"}})
        );
    }

    #[test]
    fn text_and_markdown_content_survive_serialization() {
        let samples = ["", "plain", "line one\nline two", "引号 \"quoted\" \\ <b>", "# Title\n> **bold**"];
        for s in samples {
            let value = body(&Message::text(s));
            assert_eq!(value["msgtype"], "text");
            assert_eq!(value["text"]["content"].as_str(), Some(s));

            let value = body(&Message::markdown(s));
            assert_eq!(value["msgtype"], "markdown");
            assert_eq!(value["markdown"]["content"].as_str(), Some(s));
        }
    }

    #[test]
    fn text_mentions_are_serialized_when_present() {
        let mentions = Mentions {
            user_ids: vec!["wangqing".into(), "@all".into()],
            mobiles: vec!["13800001111".into()],
        };
        let value = body(&Message::text_with_mentions("deploy done", mentions));
        assert_eq!(value["text"]["mentioned_list"], json!(["wangqing", "@all"]));
        assert_eq!(value["text"]["mentioned_mobile_list"], json!(["13800001111"]));
    }

    #[test]
    fn image_payload_encodes_and_hashes_raw_bytes() {
        let image = ImagePayload::from_bytes(b"hello");
        assert_eq!(image.base64, "aGVsbG8=");
        assert_eq!(image.md5, "5d41402abc4b2a76b9719d911017c592");

        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let value = body(&Message::image(bytes.clone()));
        assert_eq!(value["msgtype"], "image");
        let decoded = STANDARD
            .decode(value["image"]["base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, bytes);
        assert_eq!(
            value["image"]["md5"].as_str().unwrap(),
            hex::encode(Md5::digest(&bytes))
        );
    }

    #[test]
    fn empty_image_still_has_digest() {
        let image = ImagePayload::from_bytes(&[]);
        assert_eq!(image.base64, "");
        assert_eq!(image.md5, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn news_omits_absent_optional_fields() {
        let articles = vec![
            Article::new("Release 1.2", "https://example.com/r/1.2")
                .with_description("changelog")
                .with_picurl("https://example.com/banner.png"),
            Article::new("Postmortem", "https://example.com/pm"),
        ];
        let value = body(&Message::news(articles).unwrap());
        assert_eq!(
            value,
            json!({
                "msgtype": "news",
                "news": {"articles": [
                    {
                        "title": "Release 1.2",
                        "description": "changelog",
                        "url": "https://example.com/r/1.2",
                        "picurl": "https://example.com/banner.png"
                    },
                    {"title": "Postmortem", "url": "https://example.com/pm"}
                ]}
            })
        );
    }

    #[test]
    fn hand_built_news_is_validated() {
        let message = Message::News {
            articles: Vec::new(),
        };
        assert_matches!(
            Payload::from_message(&message),
            Err(crate::Error::Validation(_))
        );
    }
}
