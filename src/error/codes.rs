/// Error code registry for bigram-reduce
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Tokenization errors (per record, recoverable)
/// - 3000-3999: Partition errors
/// - 4000-4999: Aggregation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Tokenization errors (2000-2999)
    pub const TOKENIZE_INVALID_UTF8: u16 = 2001;
    pub const TOKENIZE_SENTINEL: u16 = 2002;
    pub const TOKENIZE_RECORD_TOO_LARGE: u16 = 2003;
    pub const TOKENIZE_EMPTY_TOKEN: u16 = 2004;

    // Partition errors (3000-3999)
    pub const PARTITION_GENERIC: u16 = 3000;
    pub const PARTITION_IO_ERROR: u16 = 3001;
    pub const PARTITION_NOT_FOUND: u16 = 3002;
    pub const PARTITION_RETRIES_EXHAUSTED: u16 = 3003;
    pub const PARTITION_TASK_FAILED: u16 = 3004;
    pub const PARTITION_CANCELLED: u16 = 3005;

    // Aggregation errors (4000-4999)
    pub const AGG_ZERO_COUNT: u16 = 4001;
    pub const AGG_NO_VALID_RECORDS: u16 = 4002;

    // Other errors (9000-9999)
    pub const OTHER_OUTPUT: u16 = 9001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Configuration file could not be parsed",
        1003 => "Invalid configuration value",

        // Tokenization errors
        2001 => "Record is not valid UTF-8",
        2002 => "Record contains a NUL sentinel",
        2003 => "Record exceeds the maximum size",
        2004 => "Token is empty",

        // Partition errors
        3000 => "Generic partition error",
        3001 => "Partition read failed",
        3002 => "Partition source not found",
        3003 => "Partition retries exhausted",
        3004 => "Partition task failed",
        3005 => "Partition cancelled after another partition failed",

        // Aggregation errors
        4001 => "Accumulator state holds a zero count",
        4002 => "No valid records were aggregated",

        // Other errors
        9001 => "Failed to render output",

        _ => "Unknown error code",
    }
}
