//! `featgen` - generate server features from detected API usage

mod logging;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use featgen_core::{
    FeatureCollector, FeatureGenerator, GeneratorConfig, ProcessAnalyzer, WriteOutcome,
};
use featgen_model::VersionResolver;
use std::path::PathBuf;
use std::process::ExitCode;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .default_value("featgen.toml")
        .value_parser(value_parser!(PathBuf))
        .help("Generator configuration file")
}

fn cli() -> Command {
    Command::new("featgen")
        .version(featgen_core::VERSION)
        .about("Generate server features required by an application")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("generate")
                .about("Analyze the application and update the generated features")
                .arg(config_arg())
                .arg(
                    Arg::new("no-optimize")
                        .long("no-optimize")
                        .action(ArgAction::SetTrue)
                        .help("Keep previously generated features in the analysis input"),
                )
                .arg(
                    Arg::new("class-file")
                        .long("class-file")
                        .action(ArgAction::Append)
                        .help("Analyze only this class file (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("versions")
                .about("Print the platform levels resolved from the dependencies")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("features")
                .about("Print the features declared in the server configuration")
                .arg(config_arg())
                .arg(
                    Arg::new("exclude-generated")
                        .long("exclude-generated")
                        .action(ArgAction::SetTrue)
                        .help("Ignore the generated features file"),
                ),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<GeneratorConfig> {
    let path = args
        .get_one::<PathBuf>("config")
        .context("missing --config")?;
    Ok(GeneratorConfig::load(path)?)
}

fn generate(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = load_config(args)?;
    if args.get_flag("no-optimize") {
        config = config.with_optimize(false);
    }
    if let Some(files) = args.get_many::<String>("class-file") {
        config = config.with_class_files(files.cloned());
    }

    let command = config
        .analyzer
        .clone()
        .context("no [analyzer] configured; set analyzer.program in the configuration file")?;
    let analyzer = ProcessAnalyzer::new(command.program).with_args(command.args);

    let report = FeatureGenerator::new(config, analyzer).run()?;
    if let WriteOutcome::Written { path, .. } | WriteOutcome::Cleared { path } = &report.outcome {
        tracing::debug!("updated {}", path.display());
    }
    Ok(())
}

fn versions(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let levels = VersionResolver::resolve(&config.dependencies);
    let detected = "detected by analyzer";
    println!("ee: {}", levels.ee.map_or(detected, |l| l.label()));
    println!("mp: {}", levels.mp.map_or(detected, |l| l.label()));
    Ok(())
}

fn features(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let reader = config.reader();
    let layout = config.layout();
    let declared =
        FeatureCollector::new(&reader, &layout).collect(args.get_flag("exclude-generated"))?;
    println!("{declared}");
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("generate", args)) => generate(args),
        Some(("versions", args)) => versions(args),
        Some(("features", args)) => features(args),
        _ => unreachable!("subcommand is required"),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    logging::init_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
