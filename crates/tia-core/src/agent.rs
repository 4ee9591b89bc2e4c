//! Agent bootstrap
//!
//! [`Agent::attach`] reads the agent argument, loads the configuration file,
//! configures diagnostics, creates the selection policy and the trace
//! generator, and registers a [`TraceInjector`] with the host. Every failure is
//! reported and degrades to "no injector"; attaching never fails the host.

use crate::config::AgentConfig;
use crate::error::PluginCategory;
use crate::injector::TraceInjector;
use crate::logging::LoggingConfig;
use crate::registry::{FilterRegistry, GeneratorRegistry, PluginId};
use std::path::PathBuf;
use tia_codegen::TraceGeneratorFactory;
use tia_filter::ApplicationProcessorFactory;
use tia_runtime::{HostHooks, PathResolver, UnitRewriter};
use tracing::dispatcher::with_default;
use tracing::Dispatch;

/// What [`Agent::attach`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachReport {
    /// Configuration file the argument named, if any
    pub config_file: Option<PathBuf>,
    /// Diagnostic level in effect
    pub logging: LoggingConfig,
    /// Selected selection policy
    pub filter: Option<PluginId>,
    /// Selected trace generator
    pub generator: Option<PluginId>,
    /// Whether an injector was registered
    pub installed: bool,
}

/// Trace injection agent
#[derive(Debug)]
pub struct Agent {
    filters: FilterRegistry,
    generators: GeneratorRegistry,
    dispatch: Option<Dispatch>,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent {
    /// Create agent with the built-in plugins
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: FilterRegistry::with_defaults(),
            generators: GeneratorRegistry::with_defaults(),
            dispatch: None,
        }
    }

    /// Register an additional selection-policy factory
    #[must_use]
    pub fn with_filter_factory(mut self, factory: Box<dyn ApplicationProcessorFactory>) -> Self {
        self.filters.register(factory);
        self
    }

    /// Register an additional trace-generator factory
    #[must_use]
    pub fn with_generator_factory(mut self, factory: Box<dyn TraceGeneratorFactory>) -> Self {
        self.generators.register(factory);
        self
    }

    /// Emit all diagnostics to `dispatch`, ignoring the configured level
    #[inline]
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Selection-policy factories
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Trace-generator factories
    #[inline]
    #[must_use]
    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Attach to a host
    ///
    /// `args` is the agent argument: a configuration file, or a directory
    /// holding [`DEFAULT_CONFIG_FILE_NAME`](crate::config::DEFAULT_CONFIG_FILE_NAME).
    /// An injector using `rewriter` is registered with `host` only when both a
    /// selection policy and a trace generator could be created.
    pub fn attach<R>(&self, args: Option<&str>, rewriter: R, host: &mut dyn HostHooks) -> AttachReport
    where
        R: UnitRewriter + 'static,
    {
        let bootstrap = self
            .dispatch
            .clone()
            .unwrap_or_else(|| LoggingConfig::default().dispatch());
        let (config_file, config, logging) = with_default(&bootstrap, || {
            let (config_file, config) = Self::load_config(args);
            let logging = LoggingConfig::from_setting(config.logging.as_ref());
            (config_file, config, logging)
        });

        let dispatch = self.dispatch.clone().unwrap_or_else(|| logging.dispatch());
        with_default(&dispatch, || {
            tracing::info!(
                version = crate::VERSION,
                config = ?config_file,
                level = %logging.level(),
                "trace injection agent attaching"
            );
            let paths = config_file
                .as_deref()
                .map_or_else(PathResolver::unanchored, PathResolver::new);
            let filter = self.filters.create(config.section(PluginCategory::Filter), &paths);
            let generator = self.generators.create(config.section(PluginCategory::Generator));

            let mut report = AttachReport {
                config_file: config_file.clone(),
                logging,
                filter: filter.as_ref().map(|(id, _)| id.clone()),
                generator: generator.as_ref().map(|(id, _)| id.clone()),
                installed: false,
            };
            match (filter, generator) {
                (Some((filter_id, policy)), Some((generator_id, generator))) => {
                    let injector =
                        TraceInjector::new(policy, generator, rewriter).with_dispatch(dispatch.clone());
                    host.add_hook(Box::new(injector));
                    report.installed = true;
                    tracing::info!(filter = %filter_id, generator = %generator_id, "trace injector installed");
                }
                (filter, generator) => {
                    if filter.is_none() {
                        tracing::error!("no filter, trace injector not installed");
                    }
                    if generator.is_none() {
                        tracing::error!("no generator, trace injector not installed");
                    }
                }
            }
            report
        })
    }

    fn load_config(args: Option<&str>) -> (Option<PathBuf>, AgentConfig) {
        let Some(args) = args.map(str::trim).filter(|a| !a.is_empty()) else {
            tracing::error!("no configuration file given");
            return (None, AgentConfig::default());
        };
        let path = AgentConfig::locate(args);
        match AgentConfig::load(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "configuration loaded");
                (Some(path), config)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load configuration");
                (Some(path), AgentConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tia_runtime::{DescriptorRewriter, HookChain};
    use tracing::level_filters::LevelFilter;

    #[test]
    fn no_argument_installs_nothing() {
        let mut host = HookChain::new();
        let report = Agent::new()
            .with_dispatch(Dispatch::none())
            .attach(None, DescriptorRewriter, &mut host);

        assert!(!report.installed);
        assert_eq!(report.config_file, None);
        assert_eq!(report.logging.level(), LevelFilter::INFO);
        assert!(host.is_empty());
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let mut host = HookChain::new();
        let report = Agent::new().with_dispatch(Dispatch::none()).attach(
            Some("  /definitely/not/here.json "),
            DescriptorRewriter,
            &mut host,
        );

        assert_eq!(report.config_file, Some(PathBuf::from("/definitely/not/here.json")));
        assert_eq!((report.filter, report.generator), (None, None));
        assert!(host.is_empty());
    }

    #[test]
    fn registries_start_with_builtins() {
        let agent = Agent::default();
        assert_eq!(agent.filters().len(), 2);
        assert_eq!(agent.generators().len(), 2);
    }
}
