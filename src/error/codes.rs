/// Error code registry for ansible-command
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 4000-4999: Execution errors
/// - 7000-7999: Validation errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1007;
    pub const CONFIG_PROJECT_DIR_MISSING: u16 = 1010;
    pub const CONFIG_EXECUTABLE_MISSING: u16 = 1011;
    pub const CONFIG_EXECUTABLE_NOT_EXECUTABLE: u16 = 1012;
    pub const CONFIG_EXECUTABLE_NOT_IN_PATH: u16 = 1013;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_TIMEOUT: u16 = 4002;
    pub const EXEC_SPAWN_FAILED: u16 = 4007;
    pub const EXEC_OUTPUT_ERROR: u16 = 4008;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_INVALID_INPUT: u16 = 7001;
    pub const VALIDATION_PATH_NOT_FOUND: u16 = 7002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_PARSE_ERROR => "Failed to parse configuration",
        ErrorCode::CONFIG_PROJECT_DIR_MISSING => "Ansible project directory does not exist",
        ErrorCode::CONFIG_EXECUTABLE_MISSING => "Ansible executable does not exist",
        ErrorCode::CONFIG_EXECUTABLE_NOT_EXECUTABLE => "Ansible executable is not executable",
        ErrorCode::CONFIG_EXECUTABLE_NOT_IN_PATH => "Ansible executable not found in PATH",

        ErrorCode::EXEC_GENERIC => "General execution error",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Command not found",
        ErrorCode::EXEC_TIMEOUT => "Execution timed out",
        ErrorCode::EXEC_SPAWN_FAILED => "Failed to spawn process",
        ErrorCode::EXEC_OUTPUT_ERROR => "Failed to read process output",

        ErrorCode::VALIDATION_GENERIC => "General validation error",
        ErrorCode::VALIDATION_INVALID_INPUT => "Invalid input provided",
        ErrorCode::VALIDATION_PATH_NOT_FOUND => "Path does not exist",

        _ => "Unknown error code",
    }
}
