mod commands;

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};
use frontend_utils::{log_level_from_env, setup_logging};
use log::LevelFilter;

use commands::Context;

fn cli() -> Command {
    Command::new("sls-frontend")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds, deploys and removes a static frontend next to a serverless service")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .default_value("serverless.yml")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Service file carrying the serverless-frontend-plugin block"),
        )
        .arg(
            Arg::new("stage")
                .long("stage")
                .short('s')
                .help("Stage to deploy to, overrides provider.stage"),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .short('r')
                .help("Region to deploy to, overrides provider.region"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Log debug output"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("package").about("Build the frontend"))
        .subcommand(
            Command::new("deploy")
                .about("Build the frontend, converge its stack and upload the build output"),
        )
        .subcommand(Command::new("remove").about("Empty the bucket and delete the stack"))
        .subcommand(
            Command::new("offline").about("Run the frontend dev command until interrupted"),
        )
        .subcommand(Command::new("hooks").about("List the lifecycle hooks the plugin handles"))
        .subcommand(
            Command::new("invoke")
                .about("Run the handler of a single lifecycle hook")
                .arg(
                    Arg::new("hook")
                        .required(true)
                        .help("Hook name, e.g. before:deploy:deploy"),
                ),
        )
}

fn context(matches: &ArgMatches) -> Context {
    Context {
        config_path: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("serverless.yml")),
        stage: matches.get_one::<String>("stage").cloned(),
        region: matches.get_one::<String>("region").cloned(),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        log_level_from_env(LevelFilter::Info)
    };
    if let Err(e) = setup_logging(level) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let context = context(&matches);
    let result = match matches.subcommand() {
        Some(("package", _)) => commands::handle_package(&context).await,
        Some(("deploy", _)) => commands::handle_deploy(&context).await,
        Some(("remove", _)) => commands::handle_remove(&context).await,
        Some(("offline", _)) => commands::handle_offline(&context).await,
        Some(("hooks", _)) => {
            commands::handle_hooks();
            Ok(())
        }
        Some(("invoke", invoke_matches)) => {
            let hook = invoke_matches
                .get_one::<String>("hook")
                .map(String::as_str)
                .unwrap_or_default();
            commands::handle_invoke(&context, hook).await
        }
        _ => {
            eprintln!("Invalid subcommand, see --help");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
