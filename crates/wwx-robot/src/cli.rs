use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::message::{Mentions, MessageKind};
use crate::resolve::MessageInput;

/// wwx-robot – send messages to a WeCom group robot
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  \
        wwx-robot -k xxxx -t text -d \"Hello world\"\n  \
        wwx-robot -k xxxx -t markdown -f demo/help.md\n  \
        wwx-robot -k xxxx -t image -f demo/picture.jpg\n  \
        wwx-robot -k xxxx -t news -f demo/articles.yaml"
)]
#[command(group(ArgGroup::new("content").required(true).multiple(true).args(["data", "file"])))]
pub struct Cli {
    /// Robot key (the `key` query parameter of the webhook URL)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Message type
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE")]
    pub kind: MessageKind,

    /// Message data; takes precedence over --file (text and markdown only)
    #[arg(short, long)]
    pub data: Option<String>,

    /// Message file: text/markdown file, jpg/png path or URL, YAML article list
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<String>,

    /// Robot profile from the config file
    #[arg(short, long)]
    pub robot: Option<String>,

    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Route requests through this proxy
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Webhook base URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Mention a user id in a text message (`@all` for everyone)
    #[arg(long = "mention", value_name = "USERID")]
    pub mentions: Vec<String>,

    /// Mention a phone number in a text message
    #[arg(long = "mention-mobile", value_name = "PHONE")]
    pub mention_mobiles: Vec<String>,

    /// Do not print the message preview
    #[arg(short, long)]
    pub quiet: bool,

    /// Activate verbose output (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            robot: self.robot.clone(),
            key: self.key.clone(),
            proxy: self.proxy.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn message_input(&self) -> MessageInput {
        MessageInput {
            kind: self.kind,
            data: self.data.clone(),
            file: self.file.clone(),
            mentions: Mentions {
                user_ids: self.mentions.clone(),
                mobiles: self.mention_mobiles.clone(),
            },
        }
    }
}
