pub mod real;
pub mod traits;

pub use real::SystemRunner;
pub use traits::{CommandOutput, CommandRunner, Invocation};

use crate::errors::{CaplockError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `content` to `path`, replacing any previous file.
///
/// New files are created with mode `0664` on Unix.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o664);
    }
    let mut file = options
        .open(path)
        .map_err(|e| CaplockError::io(path, e))?;
    file.write_all(content)
        .map_err(|e| CaplockError::io(path, e))?;
    Ok(())
}

pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}
