// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{DatasetArgs, fragments_command, inspect_command};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "strata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the schema inferred from a dataset directory
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// List the files a filtered scan would read
    Fragments {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Print the annotated directory tree before the fragments
        #[arg(long)]
        tree: bool,
    },
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    print!("{output}");
}

fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { dataset } => {
            diagnostics::log_info!(
                "Inspecting {root}",
                root: dataset.root.display().to_string()
            );
            inspect_command(&dataset, print_output)
        }
        Commands::Fragments { dataset, tree } => {
            diagnostics::log_info!(
                "Listing fragments under {root}",
                root: dataset.root.display().to_string()
            );
            fragments_command(&dataset, tree, print_output)
        }
    }
}
