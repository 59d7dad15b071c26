//! Named-pipe I/O channels for launched processes.
//!
//! Open order matters on a fifo: a plain read open blocks until a writer
//! exists, and once the last writer closes, unread data is discarded with
//! the pipe. The supervisor therefore opens the write side read-write
//! first (which never blocks), then the read side while that writer is
//! still held. The reader descriptor keeps the pipe and any buffered
//! output alive even if the child writes and exits before the first read.

use crate::error::LaunchError;
use std::ffi::CString;
use std::fs::File;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Creates a named pipe at `path`, replacing a stale one from a previous
/// launch.
pub fn create(path: &Path) -> Result<(), LaunchError> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(LaunchError::ChannelSetup {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
    let cpath = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        LaunchError::ChannelSetup {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        }
    })?;
    // 0o600: the channel is private to this user's session
    if unsafe { libc::mkfifo(cpath.as_ptr(), 0o600) } != 0 {
        return Err(LaunchError::ChannelSetup {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// Opens a pipe read-write for handing to the child as one of its standard
/// streams.
///
/// Opening read-write never blocks on a pipe with no peer, unlike a plain
/// read or write open.
pub fn open_writer(path: &Path) -> Result<File, LaunchError> {
    File::options()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| LaunchError::ChannelSetup {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Opens the read side of a pipe.
///
/// Must be called while a write-side descriptor from [`open_writer`] is
/// still open, so the call returns immediately instead of blocking for a
/// writer. The returned file outlives the writing process: output the
/// child produced before exiting stays readable until drained, then the
/// reader sees end-of-file.
pub fn open_reader(path: &Path) -> Result<File, LaunchError> {
    File::open(path).map_err(|e| LaunchError::ChannelSetup {
        path: path.to_path_buf(),
        source: e,
    })
}
