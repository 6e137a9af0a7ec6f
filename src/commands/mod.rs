//! # CLI Subcommands
//!
//! Contains modules that run the subcommands.

pub mod mkdsk;
pub mod put;
pub mod get;
pub mod stat;
pub mod modify;
pub mod completions;

use crate::fs::cpm::Disk;
use crate::DYNERR;

const RCH: &str = "unreachable was reached";

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("File not found")]
    FileNotFound,
    #[error("File exists, will not overwrite")]
    FileExists
}

/// Open the image named by `--dimg`, using `--format` if it was given
pub fn open_disk(cmd: &clap::ArgMatches) -> Result<Disk,DYNERR> {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let fmt = cmd.get_one::<String>("format");
    crate::create_disk_from_file(img_path,fmt.map(|s| s.as_str()))
}
