//! Command-line inspector for siq search queries.
//!
//! Parses either dialect and prints the canonical rendering, or a graphviz
//! view of the tree for debugging.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use siq_ir::{NodeRef, SyntaxError, dump_dot, parse_query, parse_sql};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "siq")]
#[command(about = "Inspect how siq parses search queries")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported `siq` subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Parse an expression-dialect query and print its canonical form
    Query {
        /// Query text, e.g. '@price:[10 (25] @color:{red|blue}'
        query: String,

        /// Print a graphviz rendering of the tree instead
        #[arg(long)]
        dot: bool,
    },

    /// Parse a statement-dialect query and print its canonical form
    Sql {
        /// Statement text, e.g. 'select * from items where price >= 10'
        statement: String,

        /// Print a graphviz rendering of the tree instead
        #[arg(long)]
        dot: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { query, dot } => match parse_query(&query) {
            Ok(expr) => report(NodeRef::from(&expr), dot),
            Err(err) => reject(err),
        },
        Commands::Sql { statement, dot } => match parse_sql(&statement) {
            Ok(stmt) => report(NodeRef::SearchStmt(&stmt), dot),
            Err(err) => reject(err),
        },
    }
}

/// Prints a parsed tree in the requested form.
fn report(node: NodeRef<'_>, dot: bool) -> ExitCode {
    if dot {
        print!("{}", dump_dot(node));
    } else {
        println!("{}", node.dump());
    }
    ExitCode::SUCCESS
}

/// Reports a parse failure.
fn reject(err: SyntaxError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}
