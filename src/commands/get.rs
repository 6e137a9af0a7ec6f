use clap;
use std::io::Write;
use std::str::FromStr;
use std::path::{Path,Component};
use log::{info,warn,error};
use crate::fs::cpm::types::TransferMode;
use super::{CommandError,RCH};
use crate::STDRESULT;

fn transfer_mode(cmd: &clap::ArgMatches) -> Result<TransferMode,CommandError> {
    let typ = cmd.get_one::<String>("type").expect(RCH);
    TransferMode::from_str(typ).map_err(|_| CommandError::InvalidCommand)
}

fn output_get(object: &[u8],maybe_out: Option<&String>) -> STDRESULT {
    match maybe_out {
        Some(path) => std::fs::write(path,object)?,
        None => match atty::is(atty::Stream::Stdout) {
            true => crate::display_block(0,object),
            false => std::io::stdout().write_all(object)?
        }
    }
    Ok(())
}

pub fn get(cmd: &clap::ArgMatches) -> STDRESULT {
    let src_name = cmd.get_one::<String>("file").expect(RCH);
    let mode = transfer_mode(cmd)?;
    let disk = super::open_disk(cmd)?;
    match disk.read_file(src_name,mode,None)? {
        Some(dat) => output_get(&dat,cmd.get_one::<String>("output")),
        None => {
            warn!("{} has no data",src_name);
            output_get(&[],cmd.get_one::<String>("output"))
        }
    }
}

/// Is a name taken from the image safe to use as a file name inside the host directory
fn is_host_safe(name: &str) -> bool {
    let mut parts = Path::new(name).components();
    match (parts.next(),parts.next()) {
        (Some(Component::Normal(_)),None) => !name.contains(['/','\\',':']),
        _ => false
    }
}

pub fn mget(cmd: &clap::ArgMatches) -> STDRESULT {
    let mode = transfer_mode(cmd)?;
    let dir = Path::new(cmd.get_one::<String>("dir").expect(RCH));
    if !dir.is_dir() {
        error!("{} is not a directory",dir.display());
        return Err(Box::new(CommandError::FileNotFound));
    }
    let disk = super::open_disk(cmd)?;
    let mut count = 0;
    let mut skipped = 0;
    for patt in cmd.get_many::<String>("file").expect(RCH) {
        let names = disk.glob(patt);
        if names.is_empty() {
            warn!("nothing matched {}",patt);
        }
        for name in names {
            if !is_host_safe(&name) {
                error!("skipping {:?}, the name is not a plain file name",name);
                skipped += 1;
                continue;
            }
            let dat = disk.read_file(&name,mode,None)?.unwrap_or_default();
            let dest = dir.join(&name);
            info!("copy {} to {}",name,dest.display());
            std::fs::write(&dest,&dat)?;
            count += 1;
        }
    }
    eprintln!("copied {} file(s)",count);
    if skipped > 0 {
        error!("{} file(s) were skipped",skipped);
        return Err(Box::new(CommandError::InvalidCommand));
    }
    Ok(())
}

#[test]
fn host_safe_names() {
    assert!(is_host_safe("ASM.COM"));
    assert!(is_host_safe("NOTYPE"));
    assert!(!is_host_safe("../ESC.TXT"));
    assert!(!is_host_safe(".."));
    assert!(!is_host_safe("A/B.TXT"));
    assert!(!is_host_safe("A\\B.TXT"));
    assert!(!is_host_safe("/ETC"));
    assert!(!is_host_safe("C:X.TXT"));
}
