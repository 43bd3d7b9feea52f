//! Staging of the `pg_worker` binary for root-run test suites.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
#[cfg(unix)]
use cap_std::fs::{Permissions, PermissionsExt};
use cap_std::fs_utf8::Dir;
use eyre::{Report, WrapErr, eyre};
use std::sync::OnceLock;

static STAGED_WORKER: OnceLock<Utf8PathBuf> = OnceLock::new();

/// Path of the worker built alongside this test binary.
const BUILT_WORKER: &str = env!("CARGO_BIN_EXE_pg_worker");

/// Copies the worker somewhere `nobody` can execute it and returns the copy.
///
/// The build directory usually lives under a home directory the
/// unprivileged user cannot traverse.
pub(super) fn prepared_worker_path() -> Result<Utf8PathBuf, Report> {
    if let Some(path) = STAGED_WORKER.get() {
        return Ok(path.clone());
    }
    let staged = stage_worker(Utf8Path::new(BUILT_WORKER))?;
    Ok(STAGED_WORKER.get_or_init(|| staged).clone())
}

fn stage_worker(source: &Utf8Path) -> Result<Utf8PathBuf, Report> {
    let temp_dir = Utf8PathBuf::try_from(std::env::temp_dir())
        .map_err(|err| eyre!("temp directory path is not valid UTF-8: {err}"))?;
    let file_name = format!("contact_desk_pg_worker_{}", std::process::id());

    let source_dir = open_dir(source.parent().unwrap_or_else(|| Utf8Path::new(".")))?;
    let source_name = source
        .file_name()
        .ok_or_else(|| eyre!("worker path {source} has no file name"))?;
    let target_dir = open_dir(&temp_dir)?;

    source_dir
        .copy(source_name, &target_dir, &file_name)
        .wrap_err_with(|| format!("copying {source} into {temp_dir}"))?;
    #[cfg(unix)]
    target_dir
        .set_permissions(&file_name, Permissions::from_mode(0o755))
        .wrap_err("marking staged worker executable")?;
    Ok(temp_dir.join(file_name))
}

fn open_dir(path: &Utf8Path) -> Result<Dir, Report> {
    Dir::open_ambient_dir(path, ambient_authority()).wrap_err_with(|| format!("opening {path}"))
}
