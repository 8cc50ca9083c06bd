//! Send text, markdown, image and news messages to a WeCom group robot.
//!
//! ```no_run
//! # async fn demo() -> wwx_robot::Result<()> {
//! use wwx_robot::{Message, Robot, RobotSettings};
//!
//! let robot = Robot::new(&RobotSettings::new("your-robot-key"))?;
//! robot.send(&Message::text("Hello world")).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod message;
pub mod payload;
pub mod preview;
pub mod resolve;
pub mod robot;
pub mod source;

pub use config::RobotSettings;
pub use error::{Error, ErrorKind, Result};
pub use message::{Article, Mentions, Message, MessageKind};
pub use resolve::{resolve, MessageInput};
pub use robot::Robot;
