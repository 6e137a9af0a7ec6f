use clap;
use log::error;
use crate::bios::geometry::Geometry;
use super::CommandError;
use crate::STDRESULT;

pub fn stat(cmd: &clap::ArgMatches) -> STDRESULT {
    let indent = cmd.get_one::<u16>("indent").copied();
    let geometry = match (cmd.get_one::<String>("dimg"),cmd.get_one::<String>("format")) {
        (Some(_),_) => *super::open_disk(cmd)?.geometry(),
        (None,Some(fmt)) => Geometry::from_name(fmt)?,
        (None,None) => {
            error!("give either a disk image or a format");
            return Err(Box::new(CommandError::InvalidCommand));
        }
    };
    println!("{}",geometry.to_json(indent));
    return Ok(());
}

pub fn catalog(cmd: &clap::ArgMatches) -> STDRESULT {
    let disk = super::open_disk(cmd)?;
    print!("{}",disk.catalog()?);
    return Ok(());
}

pub fn raw(cmd: &clap::ArgMatches) -> STDRESULT {
    let disk = super::open_disk(cmd)?;
    print!("{}",disk.raw_listing()?);
    return Ok(());
}
