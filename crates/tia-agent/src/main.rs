//! `tia-agent`: inspect an agent configuration and dry-run it over unit
//! descriptors

mod plan;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tia_core::{Agent, AgentConfig, AttachReport, FilterRegistry, PluginCategory};
use tia_runtime::{DescriptorRewriter, HookChain, LoaderScope, PathResolver, UnitDescriptor};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Agent configuration file, or a directory holding instrumenter-config.json")
}

fn cli() -> Command {
    Command::new("tia-agent")
        .version(tia_core::VERSION)
        .about("Load-time trace injection agent")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Load the configuration and report the selected plugins")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("probe")
                .about("Report whether the selection policy accepts unit names")
                .arg(config_arg())
                .arg(
                    Arg::new("units")
                        .required(true)
                        .num_args(1..)
                        .help("Internal unit names, e.g. acme/Widget$Part"),
                ),
        )
        .subcommand(
            Command::new("instrument")
                .about("Run the injector over a unit descriptor and print the injection plan")
                .arg(config_arg())
                .arg(
                    Arg::new("descriptor")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Unit descriptor (JSON)"),
                )
                .arg(
                    Arg::new("loader")
                        .long("loader")
                        .help("Name of the loader scope; bootstrap when absent"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the rewritten descriptor instead of the plan"),
                ),
        )
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let agent = match env_dispatch() {
        Some(dispatch) => Agent::new().with_dispatch(dispatch),
        None => Agent::new(),
    };

    let success = match matches.subcommand() {
        Some(("check", args)) => check(&agent, args)?,
        Some(("probe", args)) => probe(args)?,
        Some(("instrument", args)) => instrument(&agent, args)?,
        Some((other, _)) => bail!("unknown subcommand {other}"),
        None => bail!("no subcommand given"),
    };
    std::process::exit(if success { 0 } else { 1 });
}

/// `RUST_LOG` overrides the configured level
fn env_dispatch() -> Option<Dispatch> {
    let filter = EnvFilter::try_from_default_env().ok()?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    Some(Dispatch::new(subscriber))
}

fn config_path(args: &ArgMatches) -> anyhow::Result<&Path> {
    args.get_one::<PathBuf>("config")
        .map(PathBuf::as_path)
        .context("missing --config")
}

fn attach(agent: &Agent, args: &ArgMatches) -> anyhow::Result<(AttachReport, HookChain)> {
    let config = config_path(args)?;
    let config = config.to_str().context("configuration path is not valid UTF-8")?;
    let mut host = HookChain::new();
    let report = agent.attach(Some(config), DescriptorRewriter, &mut host);
    Ok((report, host))
}

fn check(agent: &Agent, args: &ArgMatches) -> anyhow::Result<bool> {
    let (report, _host) = attach(agent, args)?;
    let plugin = |id: Option<&tia_core::PluginId>| id.map_or_else(|| "none".to_string(), ToString::to_string);

    println!(
        "config:    {}",
        report
            .config_file
            .as_deref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string())
    );
    println!("logging:   {}", report.logging.level());
    println!("filter:    {}", plugin(report.filter.as_ref()));
    println!("generator: {}", plugin(report.generator.as_ref()));
    println!("installed: {}", report.installed);
    Ok(report.installed)
}

fn probe(args: &ArgMatches) -> anyhow::Result<bool> {
    let config_file = AgentConfig::locate(&config_path(args)?.to_string_lossy());
    let config = AgentConfig::load(&config_file)?;
    let (id, policy) = FilterRegistry::with_defaults()
        .try_create(config.section(PluginCategory::Filter), &PathResolver::new(&config_file))
        .context("no selection policy")?;

    println!("filter: {id}");
    for unit in args.get_many::<String>("units").into_iter().flatten() {
        let verdict = if policy.accept_unit_name(unit) { "accept" } else { "reject" };
        println!("{verdict} {unit}");
    }
    Ok(true)
}

fn instrument(agent: &Agent, args: &ArgMatches) -> anyhow::Result<bool> {
    let path = args
        .get_one::<PathBuf>("descriptor")
        .context("missing descriptor")?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let descriptor = UnitDescriptor::from_bytes(&bytes)
        .with_context(|| format!("decoding {}", path.display()))?;
    let unit_name = descriptor.to_unit().internal_name();

    let (report, host) = attach(agent, args)?;
    if !report.installed {
        bail!("no injector installed, run `tia-agent check` for details");
    }

    let scope = args
        .get_one::<String>("loader")
        .map_or_else(LoaderScope::bootstrap, LoaderScope::named);
    let Some(rewritten) = host.dispatch(&scope, &unit_name, &bytes) else {
        println!("{}: unchanged", descriptor.name);
        return Ok(true);
    };
    let rewritten = UnitDescriptor::from_bytes(&rewritten)?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&rewritten)?);
    } else {
        print!("{}", plan::render(&rewritten));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn probe_takes_many_units() {
        let matches = cli()
            .try_get_matches_from(["tia-agent", "probe", "--config", "cfg.json", "a/B", "c/D"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let units: Vec<&String> = args.get_many::<String>("units").unwrap().collect();
        assert_eq!(units, ["a/B", "c/D"]);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(cli().try_get_matches_from(["tia-agent"]).is_err());
        assert!(cli().try_get_matches_from(["tia-agent", "check"]).is_err());
    }
}
