use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::message::{Article, Message};
use crate::payload::ImagePayload;

#[derive(Tabled)]
struct ArticleRow {
    #[tabled(rename = "#")]
    index: usize,
    title: String,
    url: String,
    description: String,
    #[tabled(rename = "picture")]
    picurl: String,
}

/// Human-readable rendering of what is about to be sent.
pub fn render(message: &Message, origin: Option<&str>) -> String {
    let header = format!(
        "Try to send == {} == type message",
        message.kind().as_str().to_uppercase()
    );
    let body = match message {
        Message::Text { content, mentions } => {
            let mut out = format!("Message Content:\n{content}");
            if !mentions.user_ids.is_empty() {
                out.push_str(&format!("\nMentions: {}", mentions.user_ids.join(", ")));
            }
            if !mentions.mobiles.is_empty() {
                out.push_str(&format!("\nMention mobiles: {}", mentions.mobiles.join(", ")));
            }
            out
        }
        Message::Markdown { content } => format!("Message Content:\n{content}"),
        Message::Image { bytes } => {
            let digest = ImagePayload::from_bytes(bytes).md5;
            format!(
                "Message Content:\n{} ({} bytes, md5 {digest})",
                origin.unwrap_or("<memory>"),
                bytes.len()
            )
        }
        Message::News { articles } => format!("Message Content:\n{}", article_table(articles)),
    };
    format!("{header}\n{body}")
}

fn article_table(articles: &[Article]) -> String {
    let rows = articles.iter().enumerate().map(|(i, a)| ArticleRow {
        index: i + 1,
        title: a.title.clone(),
        url: a.url.clone(),
        description: a.description.clone().unwrap_or_default(),
        picurl: a.picurl.clone().unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        // Long descriptions would blow up the terminal
        .with(Modify::new(Columns::single(3)).with(Width::truncate(40).suffix("...")));
    table.to_string()
}
