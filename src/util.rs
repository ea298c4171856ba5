//! Utility functions for use in other parts of girih
use crate::Result;
use nix::unistd::setsid;
use std::{
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};
use tracing::info;

/// Run an external command, detached from the window manager.
///
/// The child gets its own session via `setsid` so it outlives us, and its
/// stdout / stderr are redirected to /dev/null. Reaping is handled by the
/// SIGCHLD handler installed when the manager starts.
pub fn spawn(cmd: &[String]) -> Result<()> {
    let Some((prog, args)) = cmd.split_first() else {
        return Ok(());
    };

    info!(?cmd, "spawning external command");

    let mut command = Command::new(prog);
    command
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    unsafe {
        command.pre_exec(|| {
            let _ = setsid();
            Ok(())
        });
    }

    command.spawn()?;

    Ok(())
}
