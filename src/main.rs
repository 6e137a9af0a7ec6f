//! # Command Line Interface
//!
//! The command tree is built in `cli.rs`, which is shared with the build script.
//! Subcommands are in the `commands` module of the library.

mod cli;

use env_logger;
use log::error;
use altairdsk::commands;
use altairdsk::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    let matches = cli::build_cli().get_matches();
    let default_level = match matches.get_flag("verbose") {
        true => "trace",
        false => "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match matches.subcommand() {
        Some(("catalog",cmd)) => commands::stat::catalog(cmd),
        Some(("raw",cmd)) => commands::stat::raw(cmd),
        Some(("stat",cmd)) => commands::stat::stat(cmd),
        Some(("get",cmd)) => commands::get::get(cmd),
        Some(("mget",cmd)) => commands::get::mget(cmd),
        Some(("put",cmd)) => commands::put::put(cmd),
        Some(("mput",cmd)) => commands::put::mput(cmd),
        Some(("delete",cmd)) => commands::modify::delete(cmd),
        Some(("rename",cmd)) => commands::modify::rename(cmd),
        Some(("chown",cmd)) => commands::modify::chown(cmd),
        Some(("mkdsk",cmd)) => commands::mkdsk::mkdsk(cmd),
        Some(("completions",cmd)) => commands::completions::generate(cli::build_cli(),cmd),
        _ => {
            error!("No subcommand was found, try `altairdsk --help`");
            Err(Box::new(CommandError::InvalidCommand))
        }
    }
}
