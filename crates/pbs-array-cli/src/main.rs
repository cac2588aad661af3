//! pbs-array Command-Line Interface
//!
//! Takes a list of commands and makes a PBS submittable array job.
//!
//! ```text
//! pbs-array commands.txt 12 array.pbs
//! qsub array.pbs
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use console::style;
use tracing_subscriber::EnvFilter;

use pbs_array::{ArrayError, BatchConfig, CommandsPerNode, GenerateRequest, generate};

/// Printed to stdout whenever a run fails.
const USAGE: &str = "\
Takes a list of commands and makes a PBS submittable array job.

Usage: pbs-array [OPTIONS] <cmds> <cmds-per-node> <output>

Arguments:
    <cmds>             A file with commands to run, one per line.
    <cmds-per-node>    Number of commands to run in parallel per node.
    <output>           Filename to output the script to.

Options:
    --cores-per-node <N>   Processors per node requested from PBS (default 12)
    --nodes-per-job <N>    Nodes requested per array task (default 1)
    -c, --config <FILE>    YAML file with cores_per_node / nodes_per_job
    --dry-run              Print the script instead of writing <output>
    -v, --verbose          Increase log verbosity (-v, -vv, -vvv)
";

/// pbs-array - turn a command list into a PBS array job script
#[derive(Parser, Debug)]
#[command(name = "pbs-array")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A file with commands to run, one per line
    #[arg(value_name = "cmds")]
    cmds: PathBuf,

    /// Number of commands to run in parallel per node
    #[arg(value_name = "cmds-per-node", allow_hyphen_values = true)]
    cmds_per_node: String,

    /// Filename to output the script to
    #[arg(value_name = "output")]
    output: PathBuf,

    /// Processors per node requested from PBS
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    cores_per_node: Option<u32>,

    /// Nodes requested per array task
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    nodes_per_job: Option<u32>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the script to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let rendered = e.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .trim_start_matches("error: ");
                fail(&ArrayError::Usage(message.to_string()).to_string());
            }
        },
    };

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        fail(&format!("{e}"));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let commands_per_node: CommandsPerNode = cli.cmds_per_node.parse()?;

    let mut config = BatchConfig::load(cli.config.as_deref())?;
    if let Some(cores) = cli.cores_per_node {
        config = config.with_cores_per_node(cores);
    }
    if let Some(nodes) = cli.nodes_per_job {
        config = config.with_nodes_per_job(nodes);
    }
    tracing::debug!(?config, "resolved batch configuration");

    let request = GenerateRequest::new(&cli.cmds, commands_per_node, &cli.output)
        .with_config(config)
        .with_dry_run(cli.dry_run);
    let generated = generate(&request)?;

    if generated.written {
        println!(
            "{} Wrote {} ({} commands, {} array tasks)",
            style("✓").green().bold(),
            style(cli.output.display()).cyan(),
            generated.plan.total_commands(),
            generated.plan.array_length()
        );
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(generated.script.as_bytes())?;
        stdout.flush()?;
    }

    Ok(())
}

/// Print usage and the error, then exit with status 1.
fn fail(message: &str) -> ! {
    print!("{USAGE}");
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}
