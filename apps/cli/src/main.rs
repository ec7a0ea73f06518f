//! kmimport CLI — fill a knowledge model's replies from an RDF graph.
//!
//! Reads a knowledge model and an N-Triples / N-Quads graph, matches the graph
//! against the model's RDF annotations, and emits the resulting replies.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
