use clap;
use std::io::Read;
use std::path::Path;
use log::{info,error};
use super::{CommandError,RCH};
use crate::STDRESULT;

pub fn put(cmd: &clap::ArgMatches) -> STDRESULT {
    let dest_name = cmd.get_one::<String>("file").expect(RCH);
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let file_data = match cmd.get_one::<String>("input") {
        Some(path) => std::fs::read(path)?,
        None => {
            if atty::is(atty::Stream::Stdin) {
                error!("cannot use `put` with console input, please pipe something in or use `--input`");
                return Err(Box::new(CommandError::InvalidCommand));
            }
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let mut disk = super::open_disk(cmd)?;
    let result = disk.write_file(dest_name,&file_data,None);
    // a partial file is kept if the disk fills up
    crate::save_img(&disk,img_path)?;
    let name = result?;
    info!("wrote {} bytes to {}",file_data.len(),name);
    Ok(())
}

pub fn mput(cmd: &clap::ArgMatches) -> STDRESULT {
    let img_path = cmd.get_one::<String>("dimg").expect(RCH);
    let mut disk = super::open_disk(cmd)?;
    let mut result: STDRESULT = Ok(());
    for src in cmd.get_many::<String>("input").expect(RCH) {
        let path = Path::new(src);
        let base = match path.file_name() {
            Some(b) => b.to_string_lossy().to_string(),
            None => {
                error!("{} does not name a file",src);
                result = Err(Box::new(CommandError::FileNotFound));
                break;
            }
        };
        let dat = match std::fs::read(path) {
            Ok(dat) => dat,
            Err(e) => {
                error!("could not read {}: {}",src,e);
                result = Err(Box::new(e));
                break;
            }
        };
        match disk.write_file(&base,&dat,None) {
            Ok(name) => info!("copy {} to {}",src,name),
            Err(e) => {
                error!("could not copy {}: {}",src,e);
                result = Err(e);
                break;
            }
        }
    }
    // files written before a failure are kept
    crate::save_img(&disk,img_path)?;
    result
}
