//! PBS array job script template.

use std::borrow::Cow;

use crate::config::BatchConfig;
use crate::loader::CommandList;
use crate::plan::ArrayPlan;

/// Heredoc delimiter wrapping the command block.
pub(crate) const HEREDOC_DELIMITER: &str = "EOF";

/// A rendered batch script, ready to be written out.
///
/// Held as bytes since commands are copied from the input file unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript(Vec<u8>);

impl RenderedScript {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The script as text, with invalid UTF-8 replaced. For display only.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

/// Generate a PBS array script that feeds each task's slice of `commands`
/// to `parallel`.
///
/// Task `$PBS_ARRAYID` picks lines `(id-1)*k+1 ..= id*k` of the heredoc with
/// `sed -n` and runs them `k` at a time. Commands are inserted verbatim.
pub fn render_script(
    commands: &CommandList,
    plan: &ArrayPlan,
    config: &BatchConfig,
) -> RenderedScript {
    let cpn = plan.commands_per_node();
    let mut header = String::new();

    // Shebang
    header.push_str("#!/bin/bash\n");

    // PBS directives
    header.push_str(&format!(
        "#PBS -l nodes={}:ppn={}\n",
        config.nodes_per_job, config.cores_per_node
    ));
    header.push_str("#PBS -j oe\n");
    header.push_str("#PBS -V\n");
    header.push_str(&format!("#PBS -t 1-{}\n", plan.array_length()));

    header.push_str("cd ${PBS_O_WORKDIR}\n");

    // Slice selection and fan-out
    header.push_str(&format!(
        "sed -n $(( (${{PBS_ARRAYID}}-1)*{cpn}+1 )),$(( ${{PBS_ARRAYID}}*{cpn} ))p <<{HEREDOC_DELIMITER} | parallel -j{cpn}\n"
    ));

    let mut script = header.into_bytes();
    script.extend_from_slice(&commands.joined());
    script.push(b'\n');
    script.extend_from_slice(HEREDOC_DELIMITER.as_bytes());
    script.push(b'\n');

    RenderedScript(script)
}
