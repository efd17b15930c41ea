use crate::{
    cli::{Cli, Command},
    error::Error,
    render,
    signals::{SignalEvent, wait_for_signal},
};
use config::Config;
use flume::bounded;
use kernel::{
    BootstrapReport, Catalog, ControlSurface, Dashboard, Interceptor, JsonFileStore, MemoryStore,
    PresetRuntime, Reconciler, ReqwestTransport, SelectionStore,
    domain::{EndpointKey, PresetChoice},
};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = "mockdeck.toml";

/// Where configuration and selections come from; kept so `watch` can rebuild.
#[derive(Debug, Clone)]
pub struct Sources {
    pub config_path: Option<PathBuf>,
    pub state_path: Option<PathBuf>,
    pub ephemeral: bool,
}

impl Sources {
    pub fn from_cli(cli: &Cli) -> Self {
        let config_path = cli.config.clone().or_else(|| {
            let fallback = Path::new(DEFAULT_CONFIG);
            fallback.is_file().then(|| fallback.to_owned())
        });
        Self {
            config_path,
            state_path: cli.state.clone(),
            ephemeral: cli.ephemeral,
        }
    }

    pub fn load_config(&self) -> Result<Config, config::Error> {
        match &self.config_path {
            Some(path) => Config::load(path),
            None => Config::from_env(),
        }
    }
}

/// Everything one invocation needs, wired together and restored.
pub struct App {
    pub config: Config,
    pub runtime: PresetRuntime,
    pub reconciler: Arc<Reconciler>,
    pub control: ControlSurface,
    store: Arc<dyn SelectionStore>,
}

impl App {
    /// Build the runtime from the catalog and replay saved selections.
    pub async fn start(config: Config, store: Arc<dyn SelectionStore>) -> anyhow::Result<Self> {
        let catalog = Catalog::from_config(&config)?;
        let profiles = catalog.profiles().to_vec();
        let runtime = PresetRuntime::new(catalog);
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(runtime.clone()),
            Arc::clone(&store),
            profiles,
            config.persistence.reset_policy,
        ));

        let BootstrapReport { applied, failed } = reconciler.bootstrap().await;
        if failed > 0 {
            warn!(failed, "some saved selections could not be restored");
        }
        debug!(applied, "app ready");

        Ok(Self {
            control: ControlSurface::new(Arc::clone(&reconciler)),
            config,
            runtime,
            reconciler,
            store,
        })
    }

    pub fn open_store(sources: &Sources, config: &Config) -> Arc<dyn SelectionStore> {
        if sources.ephemeral {
            return Arc::new(MemoryStore::new());
        }
        let path = sources
            .state_path
            .clone()
            .unwrap_or_else(|| config.persistence.resolved_path());
        debug!(path = %path.display(), "using selection file");
        Arc::new(JsonFileStore::new(path))
    }

    pub async fn run(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Init { .. } | Command::Watch => {
                anyhow::bail!("{command:?} runs outside of a started app")
            }
            Command::Endpoints => {
                render::endpoints(out, &self.control.endpoints(), self.control.active_count())?;
            }
            Command::Set {
                method,
                path,
                preset,
                override_with,
            } => {
                let key = EndpointKey::new(method, path);
                let choice = PresetChoice::preset(preset);
                match override_with {
                    Some(patch) => {
                        self.control
                            .select_with_override(key.clone(), choice, patch)
                            .await?
                    }
                    None => self.control.select(key.clone(), choice).await?,
                }
                writeln!(out, "{key}: {}", self.reconciler.live_status().choice(&key))?;
            }
            Command::ResetEndpoint { method, path } => {
                let key = EndpointKey::new(method, path);
                self.control.reset_endpoint(key.clone()).await?;
                writeln!(out, "{key}: {}", PresetChoice::RealApi)?;
            }
            Command::Reset => {
                self.control.reset_all().await?;
                writeln!(out, "all endpoints use the real API")?;
            }
            Command::Profiles => {
                render::profiles(
                    out,
                    &self.control.profiles(),
                    self.control.current_profile().as_deref(),
                )?;
            }
            Command::Profile { name } => {
                self.control.activate_profile(&name).await?;
                render::endpoints(out, &self.control.endpoints(), self.control.active_count())?;
            }
            Command::Resolve { method, path } => {
                let key = EndpointKey::new(method, path);
                render::interception(out, &key, &self.runtime.resolve(&key))?;
            }
            Command::Test { method, path } => {
                let dashboard = self.dashboard()?;
                let results = match (method, path) {
                    (Some(method), Some(path)) => {
                        let key = EndpointKey::new(method, path);
                        let result = dashboard.test_endpoint(&key).await;
                        vec![(key, result)]
                    }
                    _ => dashboard.test_all().await,
                };
                render::test_results(out, &results)?;
            }
        }
        Ok(())
    }

    fn dashboard(&self) -> anyhow::Result<Dashboard> {
        let transport = ReqwestTransport::new(&self.config.dashboard)?;
        let endpoints = self
            .runtime
            .catalog()
            .endpoints()
            .iter()
            .map(|spec| spec.key.clone())
            .collect();
        Ok(Dashboard::new(
            Arc::new(self.runtime.clone()),
            Arc::new(transport),
            endpoints,
        ))
    }

    /// Restore selections, then react to signals until asked to stop.
    pub async fn watch(mut self, sources: &Sources, out: &mut impl Write) -> anyhow::Result<()> {
        let (events_tx, events_rx) = bounded(8);
        let signals = tokio::spawn(async move { wait_for_signal(&events_tx).await });
        info!("watching; SIGUSR1 prints status, SIGUSR2 reloads");

        while let Ok(event) = events_rx.recv_async().await {
            debug!(?event, "Received signal event");
            match event {
                SignalEvent::DumpStatus => {
                    render::endpoints(out, &self.control.endpoints(), self.control.active_count())?;
                    out.flush()?;
                }
                SignalEvent::Reload => match sources.load_config() {
                    Ok(config) => {
                        self = App::start(config, Arc::clone(&self.store)).await?;
                        info!("configuration reloaded, selections restored");
                    }
                    Err(err) => warn!(%err, "keeping previous configuration"),
                },
                SignalEvent::Shutdown => break,
            }
        }

        if signals.is_finished() {
            signals.await??;
        } else {
            signals.abort();
        }
        Ok(())
    }
}

/// Write the sample configuration to `path`.
pub fn init(path: &Path, force: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(Error::ConfigExists(path.to_owned()).into());
    }
    std::fs::write(path, Config::sample().to_toml()?)?;
    writeln!(out, "wrote {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::HttpMethod;
    use pretty_assertions::assert_eq;

    async fn app(store: Arc<dyn SelectionStore>) -> App {
        App::start(Config::sample(), store).await.unwrap()
    }

    async fn output(app: &App, command: Command) -> String {
        let mut out = Vec::new();
        app.run(command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn selection_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selections.json");
        let store = || Arc::new(JsonFileStore::new(&path)) as Arc<dyn SelectionStore>;

        let first = app(store()).await;
        let text = output(
            &first,
            Command::Set {
                method: HttpMethod::Get,
                path: "/api/posts".into(),
                preset: "empty".into(),
                override_with: None,
            },
        )
        .await;
        assert_eq!(text, "GET /api/posts: empty\n");
        drop(first);

        let second = app(store()).await;
        let key = EndpointKey::new(HttpMethod::Get, "/api/posts");
        assert_eq!(
            second.reconciler.live_status().choice(&key),
            PresetChoice::Preset("empty".into())
        );
    }

    #[tokio::test]
    async fn initial_preset_is_active_and_can_be_reset() {
        let app = app(Arc::new(MemoryStore::new())).await;
        let text = output(
            &app,
            Command::Resolve {
                method: HttpMethod::Get,
                path: "/api/user".into(),
            },
        )
        .await;
        assert!(text.starts_with("GET /api/user: success (200)"));

        output(&app, Command::Reset).await;
        assert_eq!(app.control.active_count(), 0);
    }

    #[tokio::test]
    async fn reset_is_not_undone_by_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selections.json");
        let store = || Arc::new(JsonFileStore::new(&path)) as Arc<dyn SelectionStore>;

        let first = app(store()).await;
        assert_eq!(first.control.active_count(), 1);
        let text = output(&first, Command::Reset).await;
        assert_eq!(text, "all endpoints use the real API\n");
        drop(first);

        let second = app(store()).await;
        assert_eq!(second.control.active_count(), 0);
        let key = EndpointKey::new(HttpMethod::Get, "/api/user");
        assert_eq!(second.reconciler.live_status().choice(&key), PresetChoice::RealApi);
    }

    #[tokio::test]
    async fn unknown_preset_fails_the_command() {
        let app = app(Arc::new(MemoryStore::new())).await;
        let mut out = Vec::new();
        let err = app
            .run(
                Command::Set {
                    method: HttpMethod::Get,
                    path: "/api/user".into(),
                    preset: "nope".into(),
                    override_with: None,
                },
                &mut out,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown preset"));
    }

    #[tokio::test]
    async fn profile_command_lists_resulting_state() {
        let app = app(Arc::new(MemoryStore::new())).await;
        let text = output(&app, Command::Profile { name: "신용대출 신청".into() }).await;
        assert!(text.starts_with("Mock Manager (active: 4)"));

        let text = output(&app, Command::Profiles).await;
        assert_eq!(text, "* 신용대출 신청\n  신규 사용자\n");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mockdeck.toml");
        let mut out = Vec::new();
        init(&path, false, &mut out).unwrap();
        assert!(Config::load(&path).is_ok());
        assert!(init(&path, false, &mut out).is_err());
        init(&path, true, &mut out).unwrap();
    }
}
