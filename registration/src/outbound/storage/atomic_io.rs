//! Crash-safe file replacement inside a capability directory.
//!
//! Contents go to a hidden sibling file first, are synced, and then renamed
//! over the target, so readers see either the old file or the new one.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file` inside `dir` with `contents`.
///
/// `file` must be a single path component.
pub(crate) fn replace_file(dir: &Dir, file: &Utf8Path, contents: &str) -> io::Result<()> {
    let mut components = file.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("store file '{file}' must be a plain file name"),
        ));
    };

    let scratch = format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed)
    );

    if let Err(error) = write_scratch(dir, &scratch, contents) {
        discard(dir, &scratch);
        return Err(error);
    }
    if let Err(error) = swap_into_place(dir, &scratch, file_name) {
        discard(dir, &scratch);
        return Err(error);
    }

    // Directory sync is best effort; some platforms refuse it.
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Nothing to recover.
    }
    Ok(())
}

fn write_scratch(dir: &Dir, scratch: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(scratch, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn swap_into_place(dir: &Dir, scratch: &str, target: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    dir.rename(scratch, dir, target)
}

#[cfg(not(windows))]
fn swap_into_place(dir: &Dir, scratch: &str, target: &str) -> io::Result<()> {
    dir.rename(scratch, dir, target)
}

fn discard(dir: &Dir, scratch: &str) {
    if dir.remove_file(scratch).is_err() {
        // The scratch file may never have been created.
    }
}
