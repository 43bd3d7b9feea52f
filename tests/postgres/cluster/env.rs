//! Scoped environment changes for cluster bootstrap.

use super::worker::prepared_worker_path;
use eyre::Report;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use std::env;
use std::ffi::OsString;
use std::net::TcpListener;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

pub(super) type EnvChanges = Vec<(OsString, Option<OsString>)>;

/// Applies environment updates until dropped, then restores the old values.
///
/// Holds a process-wide lock so concurrent guards cannot interleave.
pub(super) struct EnvVarGuard {
    previous: EnvChanges,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    pub(super) fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let old = env::var_os(key);
                // SAFETY: ENV_MUTEX serialises every environment mutation in
                // this test binary.
                unsafe {
                    match value {
                        Some(new_value) => env::set_var(key, new_value),
                        None => env::remove_var(key),
                    }
                }
                (key.clone(), old)
            })
            .collect();
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe {
                match value {
                    Some(old) => env::set_var(&key, old),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

pub(super) fn to_os_pairs(env_vars: &[(String, Option<String>)]) -> EnvChanges {
    env_vars
        .iter()
        .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
        .collect()
}

/// Variables the bootstrapper reads: a free port and, under root, the
/// privilege-dropping worker binary.
pub(super) fn bootstrap_env() -> Result<EnvChanges, Report> {
    let mut changes = Vec::new();
    if env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }
    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let worker = prepared_worker_path()?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(OsString::from(worker.as_str())),
        ));
    }
    Ok(changes)
}

fn free_port() -> Result<OsString, Report> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    Ok(OsString::from(port.to_string()))
}
