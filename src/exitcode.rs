//! Process exit codes (BSD sysexits.h values)

/// Export written
pub const OK: i32 = 0;

/// Bad command line
pub const USAGE: i32 = 64;

/// Scene could not be turned into a document
pub const DATAERR: i32 = 65;

/// Output document could not be written
pub const CANTCREAT: i32 = 73;

/// Reading the scene failed
pub const IOERR: i32 = 74;

/// Broken configuration
pub const CONFIG: i32 = 78;
