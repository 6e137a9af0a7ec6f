use clap;
use log::info;
use super::RCH;
use crate::STDRESULT;

pub fn delete(cmd: &clap::ArgMatches) -> STDRESULT {
    let path_to_img = cmd.get_one::<String>("dimg").expect(RCH);
    let name_in_img = cmd.get_one::<String>("file").expect(RCH);
    let mut disk = super::open_disk(cmd)?;
    disk.erase(&name_in_img)?;
    return crate::save_img(&disk,&path_to_img);
}

pub fn rename(cmd: &clap::ArgMatches) -> STDRESULT {
    let path_to_img = cmd.get_one::<String>("dimg").expect(RCH);
    let name = cmd.get_one::<String>("name").expect(RCH);
    let name_in_img = cmd.get_one::<String>("file").expect(RCH);
    let mut disk = super::open_disk(cmd)?;
    let new_name = disk.rename(&name_in_img,&name)?;
    info!("renamed {} to {}",name_in_img,new_name);
    return crate::save_img(&disk,&path_to_img);
}

pub fn chown(cmd: &clap::ArgMatches) -> STDRESULT {
    let path_to_img = cmd.get_one::<String>("dimg").expect(RCH);
    let name_in_img = cmd.get_one::<String>("file").expect(RCH);
    let user = *cmd.get_one::<u8>("user").expect(RCH);
    let mut disk = super::open_disk(cmd)?;
    disk.chown(&name_in_img,user)?;
    return crate::save_img(&disk,&path_to_img);
}
