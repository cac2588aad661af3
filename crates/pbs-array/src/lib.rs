//! PBS array job generation from flat command lists
//!
//! This crate turns a file of shell commands, one per line, into a PBS/Torque
//! array-job script. Each array task picks a fixed-size slice of the commands
//! and runs it through `parallel` on its node.
//!
//! # Overview
//!
//! Generation is a single linear pass:
//! 1. **Load**: read and trim the command file ([`load_commands`])
//! 2. **Plan**: size the array as `ceil(commands / commands_per_node)` ([`ArrayPlan`])
//! 3. **Render**: fill the script template ([`render_script`])
//! 4. **Write**: atomically write the script with mode `0700` ([`write_script`])
//!
//! Every validation happens before the output file is touched.
//!
//! # Example
//!
//! ```no_run
//! use pbs_array::{generate, BatchConfig, CommandsPerNode, GenerateRequest};
//!
//! fn main() -> Result<(), pbs_array::ArrayError> {
//!     let request = GenerateRequest::new(
//!         "commands.txt",
//!         "8".parse::<CommandsPerNode>()?,
//!         "array.pbs",
//!     )
//!     .with_config(BatchConfig::default().with_cores_per_node(24));
//!
//!     let generated = generate(&request)?;
//!     println!("{} array tasks", generated.plan.array_length());
//!     Ok(())
//! }
//! ```
//!
//! The generated script is submitted with `qsub` by the user; this crate
//! never talks to the scheduler.

use std::path::PathBuf;

use tracing::info;

pub mod config;
pub mod error;
pub mod loader;
pub mod plan;
pub mod template;
pub mod writer;

// Re-exports
pub use config::BatchConfig;
pub use error::{ArrayError, ArrayResult};
pub use loader::{CommandList, load_commands};
pub use plan::{ArrayPlan, CommandsPerNode};
pub use template::{RenderedScript, render_script};
pub use writer::{SCRIPT_MODE, write_script};

/// Inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// File with one shell command per line.
    pub commands_file: PathBuf,
    /// Commands run in parallel by each array task.
    pub commands_per_node: CommandsPerNode,
    /// Destination of the generated script.
    pub output: PathBuf,
    /// Resource request.
    pub config: BatchConfig,
    /// Render only; do not write `output`.
    pub dry_run: bool,
}

impl GenerateRequest {
    pub fn new(
        commands_file: impl Into<PathBuf>,
        commands_per_node: CommandsPerNode,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            commands_file: commands_file.into(),
            commands_per_node,
            output: output.into(),
            config: BatchConfig::default(),
            dry_run: false,
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub plan: ArrayPlan,
    pub script: RenderedScript,
    /// Whether the script was written to the output path.
    pub written: bool,
}

/// Load, plan, render and (unless dry-running) write an array script.
pub fn generate(request: &GenerateRequest) -> ArrayResult<GeneratedScript> {
    request.config.validate()?;

    let commands = load_commands(&request.commands_file)?;
    let plan = ArrayPlan::new(
        &commands,
        request.commands_per_node,
        &request.commands_file,
    )?;
    let script = render_script(&commands, &plan, &request.config);

    if request.dry_run {
        return Ok(GeneratedScript {
            plan,
            script,
            written: false,
        });
    }

    write_script(&request.output, &script)?;
    info!(
        output = %request.output.display(),
        commands = plan.total_commands(),
        tasks = plan.array_length(),
        "generated PBS array script"
    );

    Ok(GeneratedScript {
        plan,
        script,
        written: true,
    })
}
