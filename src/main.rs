use anyhow::Result;
use clap::{App as ClapApp, Arg};
use syncho_tui::app::{App, Options};
use syncho_tui::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = ClapApp::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.yml")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("memory")
                .short("m")
                .long("memory")
                .help("Keep all data in memory instead of the remote store"),
        )
        .arg(
            Arg::with_name("workspace")
                .short("w")
                .long("workspace")
                .value_name("ID")
                .help("Open this workspace on start")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Show debug messages in the log panel"),
        )
        .get_matches();

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;

    let options = Options {
        memory: matches.is_present("memory"),
        workspace: matches.value_of("workspace").map(str::to_owned),
        verbose: matches.is_present("verbose"),
    };
    App::start(config, options).await?;
    Ok(())
}
