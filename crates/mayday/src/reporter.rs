//! The `Mayday` crash reporter
//!
//! Wires a report store, a report handler and a crash doctor into the
//! delivery use cases. One value is built per process and owned by the
//! integrator; nothing is registered globally.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use mayday_core::config::{CollectorConfig, Config};
use mayday_core::domain::{CrashDoctor, CrashReport, HeuristicDoctor};
use mayday_core::ports::{IReportHandler, IReportStore};
use mayday_core::usecases::{DeleteReportsUseCase, ReporterError, SendReportsUseCase};
use mayday_http::ApiReportHandler;
use mayday_store::FileReportStore;
use tracing::info;

/// How reports reach a collector
pub enum SetupType {
    /// The hosted collector, authenticated by an organization token
    Default {
        token: String,
        bundle_name: String,
        bundle_id: String,
    },
    /// A self-hosted HTTP collector
    Api(CollectorConfig),
    /// Any other delivery backend
    Custom(Arc<dyn IReportHandler>),
}

impl SetupType {
    fn into_handler(self) -> anyhow::Result<Arc<dyn IReportHandler>> {
        let handler: Arc<dyn IReportHandler> = match self {
            Self::Default {
                token,
                bundle_name,
                bundle_id,
            } => Arc::new(ApiReportHandler::new(CollectorConfig::hosted(
                &token,
                &bundle_name,
                &bundle_id,
            ))?),
            Self::Api(collector) => Arc::new(ApiReportHandler::new(collector)?),
            Self::Custom(handler) => handler,
        };
        Ok(handler)
    }
}

impl fmt::Debug for SetupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // The token stays out of logs
            Self::Default {
                bundle_name,
                bundle_id,
                ..
            } => f
                .debug_struct("Default")
                .field("bundle_name", bundle_name)
                .field("bundle_id", bundle_id)
                .finish_non_exhaustive(),
            Self::Api(collector) => f.debug_tuple("Api").field(&collector.url).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Crash reporter facade
///
/// ```rust,no_run
/// use std::path::Path;
/// use std::sync::Arc;
///
/// use mayday::{Mayday, SetupType};
/// use mayday_store::FileReportStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = Arc::new(FileReportStore::new());
/// let mayday = Mayday::setup(
///     SetupType::Default {
///         token: "org-token".into(),
///         bundle_name: "MyApp".into(),
///         bundle_id: "com.example.MyApp".into(),
///     },
///     store,
/// )?;
/// mayday
///     .install("com.example.MyApp", Path::new("/var/mobile/Library/Caches/Mayday"))
///     .await?;
///
/// let delivered = mayday.send_all_reports().await?;
/// println!("delivered {} reports", delivered.len());
/// # Ok(())
/// # }
/// ```
pub struct Mayday {
    store: Arc<dyn IReportStore>,
    sender: SendReportsUseCase,
    deleter: DeleteReportsUseCase,
}

impl Mayday {
    /// Builds a reporter diagnosing with the [`HeuristicDoctor`]
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client for an HTTP setup cannot be built.
    pub fn setup(setup: SetupType, store: Arc<dyn IReportStore>) -> anyhow::Result<Self> {
        Self::setup_with_doctor(setup, store, Arc::new(HeuristicDoctor))
    }

    /// Builds a reporter with a custom [`CrashDoctor`]
    pub fn setup_with_doctor(
        setup: SetupType,
        store: Arc<dyn IReportStore>,
        doctor: Arc<dyn CrashDoctor>,
    ) -> anyhow::Result<Self> {
        info!(setup = ?setup, "Setting up crash reporter");
        let handler = setup.into_handler()?;
        Ok(Self {
            sender: SendReportsUseCase::new(Arc::clone(&store), handler, doctor),
            deleter: DeleteReportsUseCase::new(Arc::clone(&store)),
            store,
        })
    }

    /// Builds a reporter over a [`FileReportStore`] from a loaded [`Config`]
    ///
    /// The store is installed at `config.store` and reports go to
    /// `config.collector`.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`Config::validate`], or if the
    /// store cannot be installed.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid configuration: {}", messages.join("; "));
        }

        let store = Arc::new(FileReportStore::new());
        store
            .install(&config.store.bundle_id, &config.store.base_path)
            .await
            .context("Failed to install report store")?;
        Self::setup(SetupType::Api(config.collector.clone()), store)
    }

    /// Prepares the report store for `bundle_id` under `base_path`
    pub async fn install(&self, bundle_id: &str, base_path: &Path) -> Result<(), ReporterError> {
        self.store
            .install(bundle_id, base_path)
            .await
            .map_err(|source| ReporterError::Store {
                operation: "install",
                source,
            })
    }

    /// Number of reports waiting to be sent
    pub async fn report_count(&self) -> Result<usize, ReporterError> {
        self.store
            .report_count()
            .await
            .map_err(|source| ReporterError::Store {
                operation: "count reports",
                source,
            })
    }

    /// Decodes, diagnoses and delivers every pending report
    ///
    /// See [`SendReportsUseCase::send_all_reports`].
    pub async fn send_all_reports(&self) -> Result<Vec<CrashReport>, ReporterError> {
        self.sender.send_all_reports().await
    }

    /// Discards every pending report without sending it
    pub async fn delete_all_reports(&self) -> Result<(), ReporterError> {
        self.deleter.delete_all_reports().await
    }
}
