use crate::Cli;
use clap::CommandFactory;
use clap_complete::Shell;

/// Write a completion script for `shell` to stdout.
pub fn completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}
