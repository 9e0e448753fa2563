//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Layer env files and resolve the backend origin
//! - Compile the initial route table
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Command-line overrides are validated like file values

use std::path::PathBuf;

use crate::config::{
    load_or_default, resolve_backend_origin, validation::validate_config, ConfigError,
    DevServerConfig, EnvLayer, DEFAULT_MODE,
};
use crate::routing::RouteTable;

/// Inputs gathered from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub mode: String,
    pub env_dir: PathBuf,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            mode: DEFAULT_MODE.to_string(),
            env_dir: PathBuf::from("."),
            host: None,
            port: None,
        }
    }
}

/// Everything the server needs before it binds.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub config: DevServerConfig,
    pub env: EnvLayer,
    pub routes: RouteTable,
}

impl Prepared {
    /// Resolve the backend origin for an already validated config.
    pub fn new(config: DevServerConfig, env: EnvLayer) -> Result<Self, ConfigError> {
        let origin = resolve_backend_origin(&config.proxy, &env)?;
        let routes = RouteTable::from_config(&config.proxy, origin);
        Ok(Self { config, env, routes })
    }

    /// Log what was loaded. Called once the subscriber is installed, since the
    /// log level itself comes from the config.
    pub fn log_summary(&self, mode: &str) {
        tracing::info!(
            mode = %mode,
            backend_origin = %self.routes.origin(),
            rules = self.routes.routes().len(),
            "Configuration loaded"
        );
    }
}

/// Load config and env, apply overrides, and compile routes.
pub fn prepare(options: &StartupOptions) -> Result<Prepared, ConfigError> {
    let mut config = load_or_default(options.config_path.as_deref())?;
    if let Some(host) = &options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    let env = EnvLayer::load(&options.env_dir, &options.mode)?;
    Prepared::new(config, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capturing_subscriber(log: &CapturedLog) -> impl tracing::Subscriber {
        let writer = log.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish()
    }

    #[test]
    fn prepare_leaves_summary_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let log = CapturedLog::default();

        let prepared = tracing::subscriber::with_default(capturing_subscriber(&log), || {
            prepare(&StartupOptions {
                env_dir: dir.path().to_path_buf(),
                ..StartupOptions::default()
            })
        })
        .unwrap();
        assert!(!log.contents().contains("Configuration loaded"));

        tracing::subscriber::with_default(capturing_subscriber(&log), || {
            prepared.log_summary("staging")
        });
        let output = log.contents();
        assert!(output.contains("Configuration loaded"), "{}", output);
        assert!(output.contains("mode=staging"), "{}", output);
        assert!(output.contains("rules=2"), "{}", output);
    }

    #[test]
    fn env_file_sets_origin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env.test-startup"), "DEVSERVER_STARTUP_TEST_URL=http://10.1.2.3:7000\n").unwrap();
        let config_path = dir.path().join("devserver.toml");
        fs::write(&config_path, "[proxy]\nenv_var = \"DEVSERVER_STARTUP_TEST_URL\"\n").unwrap();

        let prepared = prepare(&StartupOptions {
            config_path: Some(config_path),
            mode: "test-startup".into(),
            env_dir: dir.path().to_path_buf(),
            host: Some("127.0.0.1".into()),
            port: Some(6000),
        })
        .unwrap();

        assert_eq!(prepared.config.server.host, "127.0.0.1");
        assert_eq!(prepared.config.server.port, 6000);
        assert_eq!(
            prepared.routes.resolve("/api/ping").as_deref(),
            Some("http://10.1.2.3:7000/api/ping")
        );
    }

    #[test]
    fn zero_port_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare(&StartupOptions {
            env_dir: dir.path().to_path_buf(),
            port: Some(0),
            ..StartupOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
