use clap;
use std::path::Path;
use log::{info,error};
use crate::bios::geometry::Geometry;
use crate::fs::cpm::Disk;
use super::{CommandError,RCH};
use crate::STDRESULT;

pub fn mkdsk(cmd: &clap::ArgMatches) -> STDRESULT {
    let dest_path = cmd.get_one::<String>("dimg").expect(RCH);
    let fmt = cmd.get_one::<String>("format").expect(RCH);
    if Path::new(dest_path).exists() && !cmd.get_flag("force") {
        error!("{} already exists, use `--force` to overwrite",dest_path);
        return Err(Box::new(CommandError::FileExists));
    }
    let geometry = Geometry::from_name(fmt)?;
    let disk = Disk::format(geometry)?;
    info!("formatted {} image, {}K capacity",geometry,geometry.capacity_kb());
    return crate::save_img(&disk,dest_path);
}
