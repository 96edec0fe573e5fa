#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use std::process;

use colored::Colorize;

mod cli;
mod config;
mod context;
mod engine;
mod error;
mod resolve;
mod sink;
mod species;

#[cfg(test)]
mod test_util;

fn run() -> anyhow::Result<i32> {
    let Some(args) = cli::handle_cli()? else {
        // No arguments: help has been printed
        return Ok(-1);
    };
    let ctx = context::RunContext::from_env()?;
    let resolved = resolve::resolve(&args, &ctx)?;
    Ok(engine::invoke(&engine::Snakemake::from_env(), &resolved))
}

fn main() {
    let status = run().unwrap_or_else(|e| {
        eprintln!("{}", format!("Error: {:#}", e).cyan());
        -1
    });
    process::exit(status)
}
