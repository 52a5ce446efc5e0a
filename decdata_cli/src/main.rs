use clap::{Arg, Command};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use libdecdata::config::DecDataConfig;
use libdecdata::decoder::DecData;
use libdecdata::error::ConfigError;
use libdecdata::variables::VarList;

fn make_template_config(path: &Path) -> Result<(), ConfigError> {
    let config = DecDataConfig::default();
    let yaml_str = serde_yaml::to_string(&config)?;
    let mut file = File::create(path)?;
    file.write_all(yaml_str.as_bytes())?;
    Ok(())
}

fn parse_date(date: Option<&String>) -> Option<Date> {
    match date {
        Some(date) => {
            let format = format_description!("[year]-[month]-[day]");
            Date::parse(date, &format).ok()
        }
        None => Some(OffsetDateTime::now_utc().date()),
    }
}

/// Load the mapping for the run date and print every Location as a mapping-file line
fn check(config: DecDataConfig, run_date: Date) {
    let mut vars = VarList::new();
    let mut decdata = match DecData::new(config, &mut vars) {
        Ok(d) => d,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let report = match decdata.init(&mut vars, run_date) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Loading the map failed with error: {e}");
            return;
        }
    };
    log::info!("Map source: {:?}", report.source);
    log::info!(
        "{} locations, {} variables defined.",
        decdata.registry().len(),
        vars.len()
    );
    for (_, location) in decdata.registry().iter() {
        println!("{location}");
    }
    if let Err(e) = decdata.teardown(&mut vars) {
        log::error!("Teardown failed with error: {e}");
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("decdata_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(
            Command::new("check")
                .about("Resolve the decoder map for a run date and print it")
                .arg(
                    Arg::new("date")
                        .short('d')
                        .long("date")
                        .help("Run date as YYYY-MM-DD (default: today)"),
                ),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .global(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    if let Err(e) = simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Could not create logging: {e}");
    }

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(path) => PathBuf::from(path),
        None => {
            log::error!("A configuration path is required (-p/--path)");
            return;
        }
    };

    match matches.subcommand() {
        Some(("new", _)) => {
            log::info!(
                "Making a template config at {}...",
                config_path.to_string_lossy()
            );
            match make_template_config(&config_path) {
                Ok(()) => log::info!("Done."),
                Err(e) => log::error!("{e}"),
            }
        }
        Some(("check", sub_matches)) => {
            let Some(run_date) = parse_date(sub_matches.get_one::<String>("date")) else {
                log::error!("Run date must be given as YYYY-MM-DD");
                return;
            };

            // Load our config
            log::info!("Loading config from {}...", config_path.to_string_lossy());
            let config = match DecDataConfig::read_config_file(&config_path) {
                Ok(c) => c,
                Err(e) => {
                    log::error!("{e}");
                    return;
                }
            };
            log::info!("Config successfully loaded.");
            log::info!("Map file: {}", config.map_file.to_string_lossy());
            if let Some(db_dir) = &config.db_dir {
                log::info!("Database: {}", db_dir.join(config.db_file_name()).to_string_lossy());
            }
            log::info!("Run date: {run_date}");
            check(config, run_date);
            log::info!("Done.");
        }
        _ => log::error!("Unrecognized command"),
    }
}
