//! Runs embedded `PostgreSQL` lifecycle steps on behalf of the relational
//! test suite.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload-path>
//! ```
//!
//! The payload is the JSON worker document produced by
//! `pg_embedded_setup_unpriv`: cluster settings plus environment overrides.
//! When started as root the worker switches to `nobody` before touching the
//! cluster, because `initdb` and `postgres` refuse to run as root.

#[cfg(unix)]
mod unix {
    use camino::{Utf8Path, Utf8PathBuf};
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::Dir;
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use thiserror::Error;
    use tokio::runtime::Builder;

    const UNPRIVILEGED_USER: &str = "nobody";

    #[derive(Debug, Error)]
    pub enum WorkerError {
        #[error("invalid arguments: {0}")]
        InvalidArgs(String),
        #[error("failed to read payload {path}: {source}")]
        PayloadRead {
            path: Utf8PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to parse payload: {0}")]
        PayloadParse(#[source] serde_json::Error),
        #[error("settings conversion failed: {0}")]
        Settings(String),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("runtime init failed: {0}")]
        RuntimeInit(#[source] std::io::Error),
        #[error("postgres {operation} failed: {source}")]
        Postgres {
            operation: &'static str,
            #[source]
            source: postgresql_embedded::Error,
        },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn parse(value: &str) -> Result<Self, WorkerError> {
            match value {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected setup, start, or stop"
                ))),
            }
        }
    }

    pub fn run(args: impl Iterator<Item = String>) -> Result<(), WorkerError> {
        let (operation, payload_path) = parse_args(args)?;
        let payload = load_payload(&payload_path)?;
        drop_privileges_if_root()?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::RuntimeInit)?;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async {
            match operation {
                Operation::Setup => {
                    postgres.setup().await.map_err(|source| WorkerError::Postgres {
                        operation: "setup",
                        source,
                    })?;
                    ensure_started(&mut postgres).await
                }
                Operation::Start => {
                    ensure_started(&mut postgres).await?;
                    // The server must outlive this process.
                    std::mem::forget(postgres);
                    Ok(())
                }
                Operation::Stop => postgres.stop().await.map_err(|source| WorkerError::Postgres {
                    operation: "stop",
                    source,
                }),
            }
        })
    }

    pub fn parse_args(
        mut args: impl Iterator<Item = String>,
    ) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        let _program = args.next();
        let operation = args
            .next()
            .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".into()))
            .and_then(|arg| Operation::parse(&arg))?;
        let payload_path = args
            .next()
            .map(Utf8PathBuf::from)
            .ok_or_else(|| WorkerError::InvalidArgs("missing payload path argument".into()))?;
        if let Some(extra) = args.next() {
            return Err(WorkerError::InvalidArgs(format!(
                "unexpected extra argument: {extra}"
            )));
        }
        Ok((operation, payload_path))
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let read_error = |source: std::io::Error| WorkerError::PayloadRead {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "payload path has no file name",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let bytes = dir.read(file_name).map_err(read_error)?;
        serde_json::from_slice(&bytes).map_err(WorkerError::PayloadParse)
    }

    fn drop_privileges_if_root() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let privilege_error = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());

        let user = User::from_name(UNPRIVILEGED_USER)
            .map_err(privilege_error)?
            .ok_or_else(|| {
                WorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
            })?;
        let user_name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
        initgroups(&user_name, user.gid).map_err(privilege_error)?;
        setgid(user.gid).map_err(privilege_error)?;
        setuid(user.uid).map_err(privilege_error)?;

        // SAFETY: no other threads exist yet; the runtime is built afterwards.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: still single-threaded; see `drop_privileges_if_root`.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

    async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres.start().await.map_err(|source| WorkerError::Postgres {
            operation: "start",
            source,
        })
    }

}

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = std::env::args_os()
        .map(|arg| {
            arg.into_string()
                .map_err(|_| unix::WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    unix::run(args.into_iter()).map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
