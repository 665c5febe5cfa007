//! Reads a [`course_scheduler_core::contract::ScheduleRequest`] as JSON from
//! standard input, solves it, and writes the
//! [`course_scheduler_core::contract::ScheduleResponse`] as JSON to standard
//! output (spec §6 "CLI variant").

use std::io::{self, Read, Write};

use clap::Parser;
use course_scheduler_core::contract::{ScheduleRequest, ScheduleStatus};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "schedule-cli", about = "Solve a course-schedule request read from stdin")]
struct Args {
    /// Read the request from this file instead of standard input.
    #[arg(short, long)]
    input: Option<String>,

    /// Write the response to this file instead of standard output.
    #[arg(short, long)]
    output: Option<String>,

    /// Override the request's `time_limit_sec` (spec §6 solver parameters).
    #[arg(long = "time-limit")]
    time_limit: Option<f64>,

    /// Override the request's integer `scale` (float-weight to coefficient
    /// multiplier).
    #[arg(long)]
    scale: Option<i64>,

    /// Override the request's CP-SAT search worker count.
    #[arg(long)]
    workers: Option<u32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let raw = read_input(args.input.as_deref()).unwrap_or_else(|e| {
        error!("could not read request: {e}");
        std::process::exit(exitcode::NOINPUT);
    });

    let mut request: ScheduleRequest = serde_json::from_str(&raw).unwrap_or_else(|e| {
        error!("could not parse request JSON: {e}");
        std::process::exit(exitcode::DATAERR);
    });

    if let Some(time_limit) = args.time_limit {
        request.time_limit_sec = time_limit;
    }
    if let Some(scale) = args.scale {
        request.scale = scale;
    }
    if let Some(workers) = args.workers {
        request.num_search_workers = Some(workers);
    }

    let response = match course_scheduler_core::solve(&request) {
        Ok(response) => response,
        Err(e) => {
            error!("validation error: {e}");
            std::process::exit(2);
        }
    };

    let rendered = serde_json::to_string_pretty(&response).unwrap_or_else(|e| {
        error!("could not serialize response: {e}");
        std::process::exit(exitcode::SOFTWARE);
    });
    write_output(args.output.as_deref(), &rendered).unwrap_or_else(|e| {
        error!("could not write response: {e}");
        std::process::exit(exitcode::IOERR);
    });

    info!("solve finished with status {:?}", response.status);
    match response.status {
        ScheduleStatus::Optimal | ScheduleStatus::Feasible => std::process::exit(0),
        // Unknown covers a budget timeout with no feasible solution found yet,
        // bucketed with Infeasible rather than the validation-error exit code
        // (spec §6 exit-code policy).
        ScheduleStatus::Infeasible | ScheduleStatus::Unknown => std::process::exit(1),
    }
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    let mut buf = String::new();
    match path {
        Some(p) => {
            buf = std::fs::read_to_string(p)?;
        }
        None => {
            io::stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

fn write_output(path: Option<&str>, rendered: &str) -> io::Result<()> {
    match path {
        Some(p) => std::fs::write(p, rendered),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}
