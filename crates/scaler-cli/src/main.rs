mod config;

use std::io::Read;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use scaler_plugin::ffi;
use scaler_plugin::request;
use scaler_plugin::CalcOutput;
use utils::logging;
use utils::version;

use crate::config::CalcArgs;
use crate::config::Cli;
use crate::config::Commands;
use crate::config::RequestArgs;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(Some(cli.log_level.as_str()));

    match cli.command {
        Commands::Calc(args) => run_calc(args),
        Commands::Parse(args) => run_parse(args),
        Commands::Info => {
            println!("plugin id:   {}", ffi::PLUGIN_ID);
            println!("api version: {}", ffi::XRM_API_VERSION_1);
            println!("build:       {}", &**version::VERSION);
            Ok(())
        }
    }
}

fn read_request(args: &RequestArgs) -> Result<String> {
    match &args.request {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read request file {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("read request from stdin")?;
            Ok(input)
        }
    }
}

fn run_calc(args: CalcArgs) -> Result<()> {
    let input = read_request(&args.request)?;
    let output = scaler_plugin::calc_percent(&input)
        .map_err(|report| anyhow::anyhow!("{report:?}"))?;
    tracing::debug!(source = %output.source, "calculation finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if args.breakdown {
            print_breakdown(&output);
        }
        println!("{output}");
    }
    Ok(())
}

fn run_parse(args: RequestArgs) -> Result<()> {
    let input = read_request(&args)?;
    let parsed = request::parse(&input).context("parse request")?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn print_breakdown(output: &CalcOutput) {
    println!(
        "{:>7} {:>16} {:>16} {:>16} {:>9}",
        "session", "input_px/s", "ladder_px/s", "session_px/s", "load"
    );
    for (idx, session) in output.sessions.iter().enumerate() {
        println!(
            "{:>7} {:>16} {:>16} {:>16} {:>9}",
            idx,
            session.input_pixel_rate,
            session.ladder_pixel_rate,
            session.session_pixel_rate,
            session.load
        );
    }
    println!("source: {}", output.source);
}
