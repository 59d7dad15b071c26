//! `kiln run` — build the project, then launch the produced binary.

use std::io::{self, Read};
use std::sync::Arc;

use kiln_cache::BuildRequest;
use kiln_diagnostics::{ProgressSink, Severity, Stage};
use kiln_launch::{split_args, LaunchDescriptor};

use crate::pipeline::{execute, prepare, progress_sink, report};
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `kiln run` command.
///
/// Builds the project; if the build completes and produced a binary,
/// launches it with the configured arguments and environment and waits for
/// it to exit. The launched process's exit code becomes the command's exit
/// code.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let prepared = prepare(global, args.target.as_deref(), args.release)?;
    let result = execute(&prepared, None, global, BuildRequest::Full)?;
    let code = report(&result, ReportFormat::Text);
    if code != 0 {
        return Ok(code);
    }
    let Some(binary) = &result.binary else {
        return Err("build produced no binary to launch".into());
    };

    let launch_settings = &prepared.config.launch;
    let mut descriptor = LaunchDescriptor::new(binary);
    descriptor.args.extend(split_args(&launch_settings.vm_args));
    descriptor.args.extend(split_args(&launch_settings.args));
    descriptor.args.extend(args.extra_args.iter().cloned());
    for (key, value) in &launch_settings.env {
        descriptor = descriptor.env(key.as_str(), value.as_str());
    }
    let working_dir = match &launch_settings.working_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => prepared.project_dir.join(dir),
        None => prepared.project_dir.clone(),
    };
    descriptor = descriptor.working_dir(working_dir);
    if launch_settings.capture_output {
        descriptor = descriptor.capture_output(prepared.scope.session_dir().join("channels"));
    }

    let progress: Arc<dyn ProgressSink> = progress_sink(global);
    progress.stage_started(Stage::Launch, 1);
    progress.message(Severity::Info, &format!("launching {}", binary.display()));

    let mut handle = kiln_launch::launch(&descriptor, None)?;

    // Drain stderr on its own thread so neither pipe can fill up and
    // stall the child
    let stderr_pump = handle.take_stderr().map(|mut reader| {
        std::thread::spawn(move || {
            let _ = copy_to(&mut reader, &mut io::stderr().lock());
        })
    });
    if let Some(mut stdout) = handle.take_stdout() {
        let _ = copy_to(&mut stdout, &mut io::stdout().lock());
    }
    if let Some(pump) = stderr_pump {
        let _ = pump.join();
    }

    let status = handle.wait()?;
    progress.stage_finished(Stage::Launch);
    Ok(status.code().unwrap_or(1))
}

fn copy_to(reader: &mut dyn Read, writer: &mut dyn io::Write) -> io::Result<u64> {
    let mut total = 0u64;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n])?;
        writer.flush()?;
        total += n as u64;
    }
}
