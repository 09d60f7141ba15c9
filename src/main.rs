#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::Result;
use clap::Parser;
use hermes_pathmap::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hermes-pathmap", about = "Resolve request paths against a routing table")]
struct Cli {
    /// Path to routing config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Print every matching route, most specific first
    #[arg(short, long)]
    all: bool,

    /// Print lookup metrics in Prometheus text format after resolving
    #[arg(long)]
    print_metrics: bool,

    /// Request paths to resolve
    #[arg(required = true)]
    paths: Vec<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    cli::run(cli::ResolveArgs {
        config_path: args.config,
        paths: args.paths,
        all: args.all,
        print_metrics: args.print_metrics,
    })
}
