//! External process execution

pub mod runner;

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Program name from a shell command string (its first word)
pub fn program_of(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}
