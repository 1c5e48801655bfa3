//! HTTP status reference table.
//!
//! Turns the status of a failed CCG response into a readable description
//! and into the error number reported upstream.

/// Description used for statuses missing from the table.
pub const UNKNOWN: &str = "Unknown error.";

/// Error number for a response without any status line.
pub const CODE_EMPTY_REPLY: u32 = 52;

/// Error number for an internal server error on the service side.
pub const CODE_SERVER_FAULT: u32 = 89;

/// Describes an HTTP status.
pub fn describe(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        495 => "SSL Certificate Error",
        496 => "SSL Certificate Required",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        511 => "Network Authentication Required",
        _ => UNKNOWN,
    }
}

/// Error number reported for a non-200 status.
///
/// A missing status (0) becomes 52 and a 500 becomes 89; anything else is
/// reported as the status itself.
pub fn error_code(status: u16) -> u32 {
    match status {
        0 => CODE_EMPTY_REPLY,
        500 => CODE_SERVER_FAULT,
        other => u32::from(other),
    }
}
