//! Command file loading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{ArrayError, ArrayResult};

/// Ordered list of trimmed shell commands, one per input line.
///
/// Commands are kept as raw bytes: command files on clusters routinely carry
/// Latin-1 file names, and the script is written out byte for byte. Lines that
/// are empty after trimming are kept so that line numbers in the rendered
/// heredoc match the source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandList {
    commands: Vec<Vec<u8>>,
}

impl CommandList {
    /// Build a command list from raw file contents.
    ///
    /// Lines end at `\n`; a trailing newline does not start an extra line.
    /// Only ASCII whitespace is trimmed, so `\r` from CRLF files goes too.
    pub fn parse(data: impl AsRef<[u8]>) -> Self {
        let data = data.as_ref();
        if data.is_empty() {
            return Self::default();
        }

        let body = data.strip_suffix(b"\n").unwrap_or(data);
        Self {
            commands: body
                .split(|&b| b == b'\n')
                .map(|line| line.trim_ascii().to_vec())
                .collect(),
        }
    }

    /// Number of lines, including blank ones.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether at least one line holds an actual command.
    pub fn has_commands(&self) -> bool {
        self.commands.iter().any(|c| !c.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.commands.iter().map(Vec::as_slice)
    }

    /// 1-based line number of the first command equal to `line`.
    pub fn position_of(&self, line: &[u8]) -> Option<usize> {
        self.commands
            .iter()
            .position(|c| c.as_slice() == line)
            .map(|i| i + 1)
    }

    /// Commands joined with single newlines, no trailing newline.
    pub fn joined(&self) -> Vec<u8> {
        self.commands.join(&b'\n')
    }
}

impl<S: AsRef<[u8]>> FromIterator<S> for CommandList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            commands: iter
                .into_iter()
                .map(|c| c.as_ref().trim_ascii().to_vec())
                .collect(),
        }
    }
}

/// Load the command list from a file.
pub fn load_commands(path: &Path) -> ArrayResult<CommandList> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArrayError::FileNotFound(path.to_path_buf()),
        _ => ArrayError::io(path, e),
    })?;
    let commands = CommandList::parse(&data);

    debug!(
        path = %path.display(),
        lines = commands.len(),
        "loaded command file"
    );

    Ok(commands)
}
