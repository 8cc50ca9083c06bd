use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wwx_robot::cli::Cli;
use wwx_robot::config::{resolve_settings, Config};
use wwx_robot::{preview, resolve, ErrorKind, MessageKind, Robot};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(run(cli)));

    if let Err(err) = outcome {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        let lib_err = err.downcast_ref::<wwx_robot::Error>();
        if lib_err.map(|e| e.kind()) == Some(ErrorKind::Configuration) {
            eprintln!("\n{}", Cli::command().render_usage());
        }
        std::process::exit(lib_err.map(|e| e.exit_code()).unwrap_or(1));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.clone())?;
    let settings = resolve_settings(config.as_ref(), cli.overrides())?;
    let robot = Robot::new(&settings)?;

    let message = resolve(cli.message_input(), robot.http()).await?;

    if !cli.quiet {
        let origin = match cli.kind {
            MessageKind::Image => cli.file.as_deref(),
            _ => None,
        };
        println!("{}", preview::render(&message, origin));
    }

    robot.send(&message).await?;
    println!("{}", "Complete to send message".green());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "wwx_robot=debug,info",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
