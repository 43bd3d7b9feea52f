//! Embedded `PostgreSQL` cluster shared by the relational test suite.
//!
//! The cluster is bootstrapped once per test binary. Unprivileged runs start
//! it in-process; root runs delegate setup and start to the `pg_worker`
//! binary, which drops to `nobody` first. Each test then works in its own
//! scratch database.

mod env;
mod worker;

use self::env::{EnvVarGuard, bootstrap_env, to_os_pairs};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use diesel::prelude::*;
use eyre::{Report, WrapErr, eyre};
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

static SHARED_CLUSTER: OnceLock<ManagedCluster> = OnceLock::new();

/// Running embedded cluster.
pub struct ManagedCluster {
    settings: Settings,
    // Keeps an in-process server and the runtime that owns it alive.
    _in_process: Option<(Runtime, PostgreSQL)>,
}

impl ManagedCluster {
    fn start() -> Result<Self, Report> {
        let bootstrap_guard = EnvVarGuard::set_many(&bootstrap_env()?);
        let mut bootstrap = bootstrap_for_tests().wrap_err("bootstrapping test cluster")?;
        drop(bootstrap_guard);
        read_password_file(&mut bootstrap.settings)?;

        match bootstrap.privileges {
            ExecutionPrivileges::Root => {
                worker_step(&bootstrap, WorkerOperation::Setup, bootstrap.setup_timeout)?;
                worker_step(&bootstrap, WorkerOperation::Start, bootstrap.start_timeout)?;
                let mut settings = bootstrap.settings;
                read_port_from_pid_file(&mut settings)?;
                Ok(Self {
                    settings,
                    _in_process: None,
                })
            }
            ExecutionPrivileges::Unprivileged => {
                let (runtime, postgres) = start_in_process(&bootstrap)?;
                Ok(Self {
                    settings: postgres.settings().clone(),
                    _in_process: Some((runtime, postgres)),
                })
            }
        }
    }

    /// Connection URL for `database` on this cluster.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.settings.url(database)
    }

    fn admin_sql(&self, sql: &str) -> Result<(), Report> {
        let mut conn = PgConnection::establish(&self.database_url("postgres"))?;
        diesel::sql_query(sql).execute(&mut conn)?;
        Ok(())
    }

    /// Creates an empty database that is dropped with the returned guard.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin connection or `CREATE DATABASE` fails.
    pub fn scratch_database(&'static self) -> Result<ScratchDatabase, Report> {
        let name = format!("contact_desk_{}", Uuid::new_v4().simple());
        self.admin_sql(&format!("CREATE DATABASE {}", quote_identifier(&name)))?;
        Ok(ScratchDatabase {
            cluster: self,
            name,
        })
    }
}

/// Database created for a single test.
pub struct ScratchDatabase {
    cluster: &'static ManagedCluster,
    name: String,
}

impl ScratchDatabase {
    /// Connection URL for this database.
    #[must_use]
    pub fn url(&self) -> String {
        self.cluster.database_url(&self.name)
    }
}

impl Drop for ScratchDatabase {
    fn drop(&mut self) {
        let sql = format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_identifier(&self.name)
        );
        drop(self.cluster.admin_sql(&sql));
    }
}

/// Returns the shared cluster, starting it on first use.
///
/// Must not be called from inside an async runtime: the in-process start
/// path blocks on its own runtime.
///
/// # Panics
///
/// Panics with a `SKIP-TEST-CLUSTER` marker when the cluster cannot start,
/// so the failure is reported rather than silently passing.
#[must_use]
pub fn shared_cluster() -> &'static ManagedCluster {
    SHARED_CLUSTER.get_or_init(|| match ManagedCluster::start() {
        Ok(cluster) => cluster,
        Err(err) => panic!("SKIP-TEST-CLUSTER: failed to start PostgreSQL: {err:?}"),
    })
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn start_in_process(bootstrap: &TestBootstrapSettings) -> Result<(Runtime, PostgreSQL), Report> {
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let env_guard = EnvVarGuard::set_many(&to_os_pairs(&bootstrap.environment.to_env()));
    let mut postgres = PostgreSQL::new(bootstrap.settings.clone());
    runtime.block_on(async {
        postgres.setup().await?;
        if !matches!(postgres.status(), Status::Started) {
            postgres.start().await?;
        }
        Ok::<(), Report>(())
    })?;
    drop(env_guard);
    Ok((runtime, postgres))
}

fn worker_step(
    bootstrap: &TestBootstrapSettings,
    operation: WorkerOperation,
    timeout: Duration,
) -> Result<(), Report> {
    let worker = bootstrap
        .worker_binary
        .as_ref()
        .ok_or_else(|| eyre!("no pg_worker configured for a root test run"))?;
    let env_vars = bootstrap.environment.to_env();
    let args = WorkerRequestArgs {
        worker: worker.as_path(),
        settings: &bootstrap.settings,
        env_vars: &env_vars,
        operation,
        timeout,
    };
    run_worker(&WorkerRequest::new(args)).wrap_err("pg_worker step failed")?;
    Ok(())
}

/// Reads a file the bootstrapper may or may not have written.
fn read_optional(path: &Path) -> Result<Option<String>, Report> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(None);
    };
    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).wrap_err_with(|| format!("opening {}", parent.display())),
    };
    match dir.read_to_string(name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).wrap_err_with(|| format!("reading {}", path.display())),
    }
}

fn read_password_file(settings: &mut Settings) -> Result<(), Report> {
    if let Some(contents) = read_optional(&settings.password_file)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// The worker may fall back to another port; `postmaster.pid` records the
/// one actually bound on its fourth line.
fn read_port_from_pid_file(settings: &mut Settings) -> Result<(), Report> {
    let Some(contents) = read_optional(&settings.data_dir.join("postmaster.pid"))? else {
        return Ok(());
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
