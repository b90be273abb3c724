//! Pre-pivot hook planning.
//!
//! Bind mounts cannot be performed from the host: the destination paths
//! only exist inside the container's mount namespace, before `pivot_root`.
//! The planner therefore translates each declarative [`BindMount`] into
//! shell lines appended to the container's `lib/hook-child-before-pivot.sh`,
//! which `create.sh` arranges to run inside the new namespace.
//!
//! The append itself goes through the command runner (`bash -c 'echo …'`)
//! so the whole create path, hook edits included, is observable and
//! interceptable through one seam.

use crate::command::{CommandRunner, CommandSpec};
use crate::constants::{CONTAINER_ROOTFS_DIR, MOUNT_DIR, PRE_PIVOT_HOOK};
use crate::error::Result;
use crate::spec::{BindMount, BindMountOrigin};
use std::path::{Path, PathBuf};

/// Appends the mount commands for `mounts`, in order, to the container's
/// pre-pivot hook script.
pub(crate) fn append_bind_mounts(
    runner: &dyn CommandRunner,
    container_path: &Path,
    mounts: &[BindMount],
) -> Result<()> {
    let hook = container_path.join(PRE_PIVOT_HOOK);

    for mount in mounts {
        let dst = rooted(container_path.join(MOUNT_DIR), &mount.dst_path);
        let src = match mount.origin {
            BindMountOrigin::Host => mount.src_path.clone(),
            BindMountOrigin::Container => {
                rooted(container_path.join(CONTAINER_ROOTFS_DIR), &mount.src_path)
            }
        };

        append_line(runner, &hook, "")?;
        append_line(runner, &hook, &format!("mkdir -p {}", dst.display()))?;
        append_line(
            runner,
            &hook,
            &format!("mount -n --bind {} {}", src.display(), dst.display()),
        )?;
        append_line(
            runner,
            &hook,
            &format!(
                "mount -n --bind -o remount,{} {} {}",
                mount.mode.options(),
                src.display(),
                dst.display()
            ),
        )?;
    }

    Ok(())
}

/// Joins `path` under `base`, treating absolute paths as base-relative.
fn rooted(base: PathBuf, path: &Path) -> PathBuf {
    match path.strip_prefix("/") {
        Ok(rel) => base.join(rel),
        Err(_) => base.join(path),
    }
}

/// Appends one line to the hook script through the runner. An empty line
/// becomes a bare `echo`.
fn append_line(runner: &dyn CommandRunner, hook: &Path, line: &str) -> Result<()> {
    let script = if line.is_empty() {
        format!("echo >> {}", hook.display())
    } else {
        format!("echo {} >> {}", line, hook.display())
    };

    runner.run(&CommandSpec::new("bash", ["-c", script.as_str()]))
}
