//! Launching produced binaries and wiring their I/O.

use crate::descriptor::{IoChannels, LaunchDescriptor};
use crate::error::LaunchError;
use crate::fifo;
use crate::process::{CleanupGuard, ProcessHandle};
use std::fs::File;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Launches a binary per its descriptor and returns the process handle.
///
/// With captured output, stdout and stderr are routed through named pipes
/// created before the process starts. The read side of each pipe is opened
/// before spawning, while the write side handed to the child is still held
/// here; that open order never blocks, and the held reader keeps buffered
/// output alive even when the child writes and exits before the first
/// read. The optional `cleanup` callback is released at most once across
/// every termination path.
pub fn launch(
    descriptor: &LaunchDescriptor,
    cleanup: Option<Box<dyn FnOnce() + Send>>,
) -> Result<ProcessHandle, LaunchError> {
    let mut command = Command::new(&descriptor.binary);
    command.args(&descriptor.args);
    for (key, value) in &descriptor.env {
        command.env(key, value);
    }
    if let Some(dir) = &descriptor.working_dir {
        command.current_dir(dir);
    }
    command.stdin(Stdio::piped());

    let mut stdout_reader: Option<File> = None;
    let mut stderr_reader: Option<File> = None;
    match &descriptor.io {
        IoChannels::Inherit => {
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());
        }
        IoChannels::Capture { channel_dir } => {
            std::fs::create_dir_all(channel_dir).map_err(|e| LaunchError::ChannelSetup {
                path: channel_dir.clone(),
                source: e,
            })?;
            let out = channel_dir.join("stdout");
            let err = channel_dir.join("stderr");
            fifo::create(&out)?;
            fifo::create(&err)?;
            let out_writer = fifo::open_writer(&out)?;
            let err_writer = fifo::open_writer(&err)?;
            // Readers must open while the writers above are still held
            stdout_reader = Some(fifo::open_reader(&out)?);
            stderr_reader = Some(fifo::open_reader(&err)?);
            command.stdout(Stdio::from(out_writer));
            command.stderr(Stdio::from(err_writer));
        }
    }

    let child = command.spawn().map_err(|e| LaunchError::Spawn {
        program: descriptor.binary.clone(),
        source: e,
    })?;

    let guard = match cleanup {
        Some(callback) => CleanupGuard::new(callback),
        None => CleanupGuard::noop(),
    };
    Ok(ProcessHandle::new(
        child,
        stdout_reader.map(|f| Box::new(f) as Box<dyn std::io::Read + Send>),
        stderr_reader.map(|f| Box::new(f) as Box<dyn std::io::Read + Send>),
        Arc::new(guard),
    ))
}
