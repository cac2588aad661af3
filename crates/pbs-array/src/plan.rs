//! Array task planning.
//!
//! A PBS array job with `-t 1-N` starts N tasks. Each task selects its own
//! slice of the command block with `sed -n`, so the only thing to decide here
//! is how many tasks are needed to cover every command.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ArrayError, ArrayResult};
use crate::loader::CommandList;
use crate::template::HEREDOC_DELIMITER;

/// Number of commands each array task runs in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandsPerNode(NonZeroU32);

impl CommandsPerNode {
    /// Create a batch size, rejecting zero.
    pub fn new(value: u32) -> ArrayResult<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| ArrayError::invalid_argument(&value.to_string(), "must be at least 1"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn as_usize(self) -> usize {
        self.0.get() as usize
    }
}

impl FromStr for CommandsPerNode {
    type Err = ArrayError;

    /// Parse a batch size from the command line.
    ///
    /// Only plain ASCII digits are accepted, so signs, whitespace and decimals
    /// are rejected along with zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArrayError::invalid_argument(s, "not a positive integer"));
        }

        let value: u32 = s
            .parse()
            .map_err(|_| ArrayError::invalid_argument(s, "value is too large"))?;

        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| ArrayError::invalid_argument(s, "must be at least 1"))
    }
}

impl fmt::Display for CommandsPerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout of a PBS array job over a command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayPlan {
    total_commands: usize,
    commands_per_node: CommandsPerNode,
    array_length: usize,
}

impl ArrayPlan {
    /// Plan the array for `commands`, or fail if there is nothing to run.
    ///
    /// A command equal to the heredoc delimiter would close the command block
    /// early and is rejected. `source` only names the input in the error.
    pub fn new(
        commands: &CommandList,
        commands_per_node: CommandsPerNode,
        source: &Path,
    ) -> ArrayResult<Self> {
        if !commands.has_commands() {
            return Err(ArrayError::EmptyInput(source.to_path_buf()));
        }
        if let Some(line) = commands.position_of(HEREDOC_DELIMITER.as_bytes()) {
            return Err(ArrayError::ReservedCommand {
                path: source.to_path_buf(),
                line,
                command: HEREDOC_DELIMITER.to_string(),
            });
        }

        let plan = Self::for_total(commands.len(), commands_per_node);
        debug!(
            total = plan.total_commands,
            per_node = %commands_per_node,
            tasks = plan.array_length,
            "planned array job"
        );
        Ok(plan)
    }

    /// Ceiling division of `total` by the batch size. `total` must be non-zero.
    pub(crate) fn for_total(total: usize, commands_per_node: CommandsPerNode) -> Self {
        Self {
            total_commands: total,
            commands_per_node,
            array_length: total.div_ceil(commands_per_node.as_usize()),
        }
    }

    /// Number of array tasks (`N` in `#PBS -t 1-N`).
    pub fn array_length(&self) -> usize {
        self.array_length
    }

    pub fn commands_per_node(&self) -> CommandsPerNode {
        self.commands_per_node
    }

    pub fn total_commands(&self) -> usize {
        self.total_commands
    }

    /// 1-based line range of the command block that array task `task_id` runs.
    ///
    /// The last task may get fewer lines than the batch size. Returns `None` for
    /// task ids outside `1..=array_length`.
    pub fn task_range(&self, task_id: usize) -> Option<RangeInclusive<usize>> {
        if task_id == 0 || task_id > self.array_length {
            return None;
        }
        let k = self.commands_per_node.as_usize();
        let start = (task_id - 1) * k + 1;
        let end = (task_id * k).min(self.total_commands);
        Some(start..=end)
    }
}
