#[macro_use]
extern crate log;
extern crate clap;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::Env;

use common::input_data::{DATA_DIR_PARAM, PARAM_PREFIX};
use common::{Fragment, FragmenterError, InputData};
use fragmenter::partition::{INTERVAL, PARTITION_BY, RANGE};
use fragmenter::{FragmenterConfig, JdbcPartitionFragmenter};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::collections::HashMap;
use std::fs;

/// Arguments shared by both subcommands: the partition user properties.
fn plan_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("partition_by")
            .long("partition-by")
            .value_name("COLUMN:TYPE")
            .help("Partition column and type (date, int or enum)")
            .takes_value(true),
        Arg::with_name("range")
            .long("range")
            .value_name("RANGE")
            .help("Colon separated range bounds or enum values")
            .takes_value(true),
        Arg::with_name("interval")
            .long("interval")
            .value_name("N[:UNIT]")
            .help("Fragment width, with a day, month or year unit for dates")
            .takes_value(true),
    ]
}

/// Builds the request the engine would send for `source` from the command line.
fn input_data(matches: &ArgMatches, source: &str) -> Result<InputData, FragmenterError> {
    let mut params = HashMap::new();
    params.insert(DATA_DIR_PARAM.to_string(), source.to_string());
    for (arg, prop) in &[
        ("partition_by", PARTITION_BY),
        ("range", RANGE),
        ("interval", INTERVAL),
    ] {
        if let Some(value) = matches.value_of(arg) {
            params.insert(format!("{}{}", PARAM_PREFIX, prop), value.to_string());
        }
    }
    InputData::new(params)
}

fn load_config(matches: &ArgMatches) -> Result<FragmenterConfig, FragmenterError> {
    if let Some(path) = matches.value_of("config") {
        return FragmenterConfig::from_json_file(path);
    }
    let max_fragments = match matches.value_of("max_fragments") {
        Some(m) => Some(m.parse::<usize>().map_err(|_| {
            FragmenterError::UserDataError(format!(
                "--max-fragments must be a non-negative integer, but actual is '{}'",
                m
            ))
        })?),
        None => None,
    };
    Ok(FragmenterConfig {
        host_address: matches.value_of("host_address").map(String::from),
        max_fragments,
    })
}

/// Prints the fragments of a table as JSON, optionally saving them for `sql`.
fn run_fragments(matches: &ArgMatches, config: FragmenterConfig) -> Result<(), FragmenterError> {
    let source = matches.value_of("source").unwrap_or_default();
    let fragmenter = JdbcPartitionFragmenter::new(input_data(matches, source)?, config)?;
    let fragments = fragmenter.get_fragments()?;

    if let Some(path) = matches.value_of("output") {
        fs::write(path, serde_cbor::to_vec(&fragments)?)?;
        info!("Wrote {} fragments to {}", fragments.len(), path);
    }
    let json = serde_json::to_string_pretty(&fragments)
        .map_err(|e| FragmenterError::SerializationError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Prints the query a worker reading one saved fragment would run.
fn run_sql(matches: &ArgMatches, config: FragmenterConfig) -> Result<(), FragmenterError> {
    let path = matches.value_of("fragments").unwrap_or_default();
    let fragments: Vec<Fragment> = serde_cbor::from_slice(&fs::read(path)?)?;
    let index_arg = matches.value_of("index").unwrap_or("0");
    let index: usize = index_arg.parse().map_err(|_| {
        FragmenterError::UserDataError(format!("--index must be a number, got '{}'", index_arg))
    })?;
    let fragment = fragments.get(index).ok_or_else(|| {
        FragmenterError::UserDataError(format!(
            "fragment {} not found, {} holds {} fragments",
            index,
            path,
            fragments.len()
        ))
    })?;

    let input = input_data(matches, &fragment.source_name)?
        .with_fragment_metadata(fragment.metadata.clone());
    let fragmenter = JdbcPartitionFragmenter::new(input, config)?;
    let sql = fragmenter.build_fragmenter_sql(
        matches.value_of("db").unwrap_or_default(),
        matches.value_of("query").unwrap_or_default(),
    )?;
    check_sql(&sql);
    println!("{}", sql);
    Ok(())
}

/// Warns when the narrowed query does not parse as generic SQL.
///
/// Dialect-specific date literals may not parse as generic SQL, so only a warning is logged.
fn check_sql(sql: &str) {
    let dialect = GenericDialect {};
    match Parser::parse_sql(&dialect, sql.to_string()) {
        Ok(_) => debug!("Narrowed query parses as generic SQL"),
        Err(e) => warn!("Narrowed query does not parse as generic SQL: {}", e),
    }
}

fn main() {
    // Configure log environment
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("host_address")
                .long("host-address")
                .value_name("ADDR")
                .help("Replica address reported for every fragment")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max_fragments")
                .long("max-fragments")
                .value_name("N")
                .help("Fail when a request would produce more fragments")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("fragments")
                .about("Computes the fragments of a table")
                .args(&plan_args())
                .arg(
                    Arg::with_name("source")
                        .short("s")
                        .long("source")
                        .value_name("TABLE")
                        .help("Table to fragment")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("Saves the fragments for the sql subcommand")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("sql")
                .about("Narrows a query to one saved fragment")
                .args(&plan_args())
                .arg(
                    Arg::with_name("fragments")
                        .short("f")
                        .long("fragments")
                        .value_name("FILE")
                        .help("Fragments saved by the fragments subcommand")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("index")
                        .short("i")
                        .long("index")
                        .value_name("N")
                        .default_value("0")
                        .help("Fragment to narrow to")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("db")
                        .long("db")
                        .value_name("PRODUCT")
                        .default_value("PostgreSQL")
                        .help("Database product name, selects the date literal dialect")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("query")
                        .short("q")
                        .long("query")
                        .value_name("SQL")
                        .help("Query reading the whole table")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .get_matches();

    let result = load_config(&matches).and_then(|config| {
        info!("Using {:?}", config);
        match matches.subcommand() {
            ("fragments", Some(sub)) => run_fragments(sub, config),
            ("sql", Some(sub)) => run_sql(sub, config),
            _ => Ok(()),
        }
    });
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
