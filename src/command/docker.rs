use super::runner::ImageRunner;
use super::{command_line, CommandError, CommandResult};
use async_trait::async_trait;
use bollard::container::{
    Config, DownloadFromContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    WaitContainerOptions,
};
use bollard::errors::Error;
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures::{pin_mut, StreamExt, TryStreamExt};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// OCI label carrying the version of the packaged software.
pub const IMAGE_VERSION_LABEL: &str = "org.opencontainers.image.version";

/// Runs one-shot containers through the local Docker daemon.
#[derive(Clone)]
pub struct DockerRunner {
    docker: Docker,
}

impl DockerRunner {
    pub fn connect() -> Result<Self, CommandError> {
        Ok(Self::new(Docker::connect_with_socket_defaults()?))
    }

    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Pulls the image unless it is already present locally.
    pub async fn ensure_image(&self, image: &str) -> Result<(), CommandError> {
        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }
        info!(%image, "pulling image");
        self.docker
            .create_image(
                Some(CreateImageOptions::<String> {
                    from_image: image.to_string(),
                    ..Default::default()
                }),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await?;
        Ok(())
    }

    async fn create(&self, image: &str, argv: &[String]) -> Result<ContainerGuard, CommandError> {
        let (entrypoint, cmd) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
        self.ensure_image(image).await?;

        let config = Config::<String> {
            image: Some(image.to_string()),
            entrypoint: Some(vec![entrypoint.clone()]),
            cmd: Some(cmd.to_vec()),
            ..Default::default()
        };
        let id = self
            .docker
            .create_container::<String, String>(None, config)
            .await?
            .id;
        debug!(%image, container = %id, "container created");

        Ok(ContainerGuard {
            docker: self.docker.clone(),
            id,
            removed: false,
        })
    }

    async fn wait(&self, id: &str) -> Result<i64, CommandError> {
        let waits = self
            .docker
            .wait_container(id, None::<WaitContainerOptions<String>>);
        pin_mut!(waits);
        let mut exit_code = 0;
        while let Some(wait) = waits.next().await {
            match wait {
                Ok(response) => exit_code = response.status_code,
                // non zero exit codes are reported as errors by the daemon
                Err(Error::DockerContainerWaitError { code, .. }) => exit_code = code,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(exit_code)
    }

    async fn output(&self, id: &str) -> Result<(String, String), CommandError> {
        let mut logs = self.docker.logs(
            id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );
        let (mut stdout, mut stderr) = (String::new(), String::new());
        while let Some(log) = logs.next().await {
            match log? {
                LogOutput::StdOut { message } => stdout.push_str(&String::from_utf8_lossy(&message)),
                LogOutput::StdErr { message } => stderr.push_str(&String::from_utf8_lossy(&message)),
                _ => {}
            }
        }
        Ok((stdout, stderr))
    }

    /// Whether `path` exists in the filesystem of the container, which does not need to run.
    async fn container_path_exists(&self, id: &str, path: &str) -> Result<bool, CommandError> {
        let archive = self.docker.download_from_container(
            id,
            Some(DownloadFromContainerOptions {
                path: path.to_string(),
            }),
        );
        pin_mut!(archive);
        match archive.next().await {
            Some(Err(Error::DockerResponseServerError {
                status_code: 404, ..
            })) => Ok(false),
            Some(Err(err)) => Err(err.into()),
            _ => Ok(true),
        }
    }
}

#[async_trait]
impl ImageRunner for DockerRunner {
    async fn run_in_image(
        &self,
        image: &str,
        argv: &[String],
    ) -> Result<CommandResult, CommandError> {
        let command = command_line(argv);
        info!(%image, %command, "running command in image");
        let mut container = self.create(image, argv).await?;

        let run = async {
            self.docker
                .start_container::<String>(&container.id, None)
                .await?;
            let exit_code = self.wait(&container.id).await?;
            let (stdout, stderr) = self.output(&container.id).await?;
            Ok::<_, CommandError>((exit_code, stdout, stderr))
        }
        .await;
        container.remove().await;
        let (exit_code, stdout, stderr) = run?;

        let result = CommandResult {
            command,
            stdout,
            stderr,
            exit_code,
        };
        debug!(%image, command = %result.command, exit_code, "command finished");
        Ok(result)
    }

    async fn image_version(&self, image: &str) -> Result<Option<String>, CommandError> {
        self.ensure_image(image).await?;
        let inspect = self.docker.inspect_image(image).await?;

        Ok(inspect
            .config
            .and_then(|config| config.labels)
            .and_then(|mut labels| labels.remove(IMAGE_VERSION_LABEL)))
    }

    async fn path_exists(&self, image: &str, path: &str) -> Result<bool, CommandError> {
        let mut container = self.create(image, &["true".to_string()]).await?;
        let exists = self.container_path_exists(&container.id, path).await;
        container.remove().await;
        exists
    }
}

/// Force-removes the container when dropped, so no container outlives a failed or cancelled run.
struct ContainerGuard {
    docker: Docker,
    id: String,
    removed: bool,
}

impl ContainerGuard {
    async fn remove(&mut self) {
        if !self.removed {
            remove_container(&self.docker, &self.id).await;
            self.removed = true;
        }
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        // async drop doesn't exist, the removal is left to the runtime driving the connection.
        match Handle::try_current() {
            Ok(handle) => {
                let docker = self.docker.clone();
                let id = std::mem::take(&mut self.id);
                handle.spawn(async move { remove_container(&docker, &id).await });
            }
            Err(_) => warn!(container = %self.id, "no runtime left to remove the container"),
        }
    }
}

async fn remove_container(docker: &Docker, id: &str) {
    let removal = docker
        .remove_container(
            id,
            Some(RemoveContainerOptions {
                force: true,
                ..Default::default()
            }),
        )
        .await;
    if let Err(err) = removal {
        warn!(container = %id, %err, "failed to remove container");
    }
}
