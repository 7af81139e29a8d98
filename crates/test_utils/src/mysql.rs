//! MySQL container management for integration tests
//!
//! Provides utilities for starting an ephemeral MySQL server in Docker
//! and waiting until it accepts connections.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::service::{HostConfig, PortBinding, PortMap};
use bollard::Docker;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder};
use tokio::time::sleep;
use uuid::Uuid;

#[cfg(test)]
#[path = "mysql_tests.rs"]
mod tests;

/// Container-side MySQL port, in the Docker port map key format.
const MYSQL_PORT: &str = "3306/tcp";

/// Total budget for the database to start accepting connections.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Grace period given to the server on shutdown, in seconds.
const STOP_GRACE_SECONDS: i64 = 10;

/// Manages an ephemeral MySQL server for testing.
///
/// [`MysqlContainer::start`] boots the given image with a fresh root
/// password, publishes the MySQL port on an ephemeral loopback port, and
/// returns once the server accepts connections. The connection details are
/// available through the accessors until [`MysqlContainer::stop`] is
/// called; the fixture must not be used afterwards.
///
/// # Examples
///
/// ```no_run
/// # use test_utils::MysqlContainer;
/// # async fn example() -> anyhow::Result<()> {
/// let mut container = MysqlContainer::start("mysql:8").await?;
///
/// let url = format!(
///     "mysql://{}:{}@{}:{}",
///     container.user(),
///     container.password(),
///     container.host(),
///     container.port(),
/// );
/// // ... run tests against the database ...
///
/// container.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct MysqlContainer {
    docker: Docker,
    container_id: Option<String>,
    host: String,
    port: u16,
    user: String,
    password: String,
}

impl MysqlContainer {
    /// Start a MySQL container from the given image and wait until it is
    /// ready for connections.
    ///
    /// The root password is a fresh UUID, so every fixture instance gets
    /// its own credentials. The data directory is a tmpfs mount, keeping
    /// the instance fully ephemeral. The Docker daemon handle is acquired
    /// here rather than at load time, so merely linking this crate has no
    /// side effects.
    ///
    /// # Arguments
    ///
    /// * `image` - MySQL image to run (e.g. "mysql:8")
    ///
    /// # Errors
    ///
    /// Fails if the Docker daemon is not reachable, the container cannot
    /// be created or started, or the server does not accept connections
    /// within the readiness budget.
    pub async fn start(image: &str) -> Result<Self> {
        let user = "root".to_string();
        let password = Uuid::new_v4().to_string();

        let docker =
            Docker::connect_with_local_defaults().context("Failed to connect to Docker daemon")?;

        // Generate unique container name to avoid conflicts
        let container_name = format!("mysql_test_{}", Uuid::new_v4());

        let env_vars = vec![format!("MYSQL_ROOT_PASSWORD={}", password)];

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            MYSQL_PORT.to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                // Host port 0 asks Docker for an ephemeral port
                host_port: Some("0".to_string()),
            }]),
        );

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(MYSQL_PORT.to_string(), HashMap::new());

        let mut tmpfs = HashMap::new();
        tmpfs.insert("/var/lib/mysql".to_string(), "rw".to_string());

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            tmpfs: Some(tmpfs),
            ..Default::default()
        };

        let container_config = Config {
            image: Some(image.to_string()),
            env: Some(env_vars),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container = docker
            .create_container(
                Some(CreateContainerOptions {
                    name: container_name.as_str(),
                    ..Default::default()
                }),
                container_config,
            )
            .await
            .context("Failed to create container")?;

        // Hold the id before starting so cleanup covers every later failure
        let mut fixture = Self {
            docker,
            container_id: Some(container.id.clone()),
            host: "127.0.0.1".to_string(),
            port: 0,
            user,
            password,
        };

        fixture
            .docker
            .start_container(&container.id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start container")?;

        tracing::info!("Container started: {}", container.id);

        fixture.port = fixture.published_port(&container.id).await?;
        fixture.wait_for_ready().await?;

        Ok(fixture)
    }

    /// Host name the database listens on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Ephemeral host port mapped to the MySQL port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// User name for the ephemeral credentials.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password for the ephemeral credentials.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Look up the host port Docker assigned to the MySQL port.
    async fn published_port(&self, container_id: &str) -> Result<u16> {
        let inspect = self
            .docker
            .inspect_container(container_id, None)
            .await
            .context("Failed to inspect container")?;

        let ports = inspect
            .network_settings
            .and_then(|settings| settings.ports)
            .context("Container has no published ports")?;

        host_port_from(&ports, MYSQL_PORT)
    }

    /// Wait for the database to accept connections.
    ///
    /// Probes the server on a fixed interval until it answers a trivial
    /// query. Probe failures are swallowed and retried until the readiness
    /// budget is spent, at which point the last failure is wrapped in the
    /// returned error.
    async fn wait_for_ready(&self) -> Result<()> {
        let start_time = Instant::now();

        tracing::info!("Waiting for MySQL to be ready for connections...");

        loop {
            match self.probe().await {
                Ok(()) => {
                    tracing::info!("MySQL is ready after {:?}", start_time.elapsed());
                    return Ok(());
                }
                Err(e) => {
                    if start_time.elapsed() > READY_TIMEOUT {
                        anyhow::bail!(
                            "Timed out waiting for the database to be ready for connections, {}",
                            e
                        );
                    }
                    tracing::debug!("Readiness probe failed: {}", e);
                }
            }

            sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Run a single readiness probe.
    ///
    /// The probe connection is released before the result is acted on, so
    /// no connection outlives its attempt.
    async fn probe(&self) -> Result<()> {
        let opts = connection_opts(&self.host, self.port, &self.user, &self.password);

        let mut conn = Conn::new(opts)
            .await
            .context("Failed to open probe connection")?;
        let version: std::result::Result<Option<String>, _> =
            conn.query_first("SELECT version()").await;
        let _ = conn.disconnect().await;

        match version.context("Readiness query failed")? {
            Some(_) => Ok(()),
            None => anyhow::bail!("Readiness query returned no rows"),
        }
    }

    /// Stop and remove the container.
    ///
    /// The server gets a bounded grace period to shut down before it is
    /// killed. The fixture must not be used after this returns.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(container_id) = &self.container_id {
            tracing::info!("Stopping container: {}", container_id);

            self.docker
                .stop_container(
                    container_id,
                    Some(StopContainerOptions {
                        t: STOP_GRACE_SECONDS,
                    }),
                )
                .await
                .context("Failed to stop container")?;

            self.docker
                .remove_container(
                    container_id,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await
                .context("Failed to remove container")?;

            tracing::info!("Container stopped and removed");
            self.container_id = None;
        }

        Ok(())
    }
}

impl Drop for MysqlContainer {
    fn drop(&mut self) {
        // Best-effort cleanup on drop
        if let Some(container_id) = &self.container_id {
            let docker = self.docker.clone();
            let id = container_id.clone();

            tokio::spawn(async move {
                let _ = docker.stop_container(&id, None).await;
                let _ = docker.remove_container(&id, None).await;
            });
        }
    }
}

/// Extract the numeric host port bound to `container_port` from a Docker
/// port map.
fn host_port_from(ports: &PortMap, container_port: &str) -> Result<u16> {
    let binding = ports
        .get(container_port)
        .and_then(|bindings| bindings.as_ref())
        .and_then(|bindings| bindings.first())
        .with_context(|| format!("Port {} is not published", container_port))?;

    let host_port = binding
        .host_port
        .as_deref()
        .with_context(|| format!("Port {} has no host port assigned", container_port))?;

    host_port
        .parse()
        .with_context(|| format!("Invalid host port '{}'", host_port))
}

/// Connection options for the ephemeral credentials.
fn connection_opts(host: &str, port: u16, user: &str, password: &str) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(host)
        .tcp_port(port)
        .user(Some(user))
        .pass(Some(password))
        .into()
}
