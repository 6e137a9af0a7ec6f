//! # `altairdsk` main library
//!
//! This library manipulates CP/M disk images made for the Altair 8800 and its emulators.
//!
//! ## Architecture
//!
//! Disk image operations are built in three layers:
//! * `bios` holds the disk geometries and the sector skew tables
//! * `img::altair::AltairImage` maps allocation blocks and records to raw sectors, and keeps checksums right
//! * `fs::cpm::Disk` imposes the CP/M file system on the image
//!
//! When a `Disk` object is created it takes ownership of the image buffer.
//! It then uses this owned buffer as storage.  Any changes are not permanent until the
//! image is saved to whatever file system is hosting altairdsk.
//!
//! ## Disk Formats
//!
//! The image carries no metadata, so the format is identified by the length of the image,
//! unless it is named explicitly.  Supported formats are
//! * MITS 8 inch floppy (FDD_8IN), and its 8MB variant (FDD_8IN_8MB)
//! * MITS 5MB hard disk (HDD_5MB), and its 1024 directory entry variant (HDD_5MB_1024)
//! * Tarbell floppy (TARBELL_FDD)
//! * FDC+ 1.5MB floppy (FDD_1.5MB)
//! * SIMH 8 inch floppy (SIMH_FDD_8IN)

pub mod fs;
pub mod bios;
pub mod img;
pub mod commands;

use log::info;
use fs::cpm::Disk;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Save the image file (make changes permanent)
pub fn save_img(disk: &Disk,img_path: &str) -> STDRESULT {
    std::fs::write(img_path,disk.to_bytes())?;
    Ok(())
}

/// Given a bytestream return a Disk, or Err if the bytestream cannot be interpreted.
/// If `format` is None the format is identified by the length of the bytestream.
pub fn create_disk_from_bytestream(disk_img_data: &[u8],format: Option<&str>) -> Result<Disk,DYNERR> {
    let disk = Disk::open(disk_img_data,format,None)?;
    info!("opened {} image of {} bytes",disk.geometry(),disk_img_data.len());
    Ok(disk)
}

/// Calls `create_disk_from_bytestream` getting the bytes from a file.
pub fn create_disk_from_file(img_path: &str,format: Option<&str>) -> Result<Disk,DYNERR> {
    match std::fs::read(img_path) {
        Ok(disk_img_data) => create_disk_from_bytestream(&disk_img_data,format),
        Err(e) => Err(Box::new(e))
    }
}

/// Display binary to stdout in columns of hex and ascii
pub fn display_block(start_addr: usize,block: &[u8]) {
    let mut slice_start = 0;
    loop {
        let row_label = start_addr + slice_start;
        let mut slice_end = slice_start + 16;
        if slice_end > block.len() {
            slice_end = block.len();
        }
        let slice = block[slice_start..slice_end].to_vec();
        let txt: Vec<u8> = slice.iter().map(|c| match *c {
            x if x<32 => '.' as u8,
            x if x<127 => x,
            _ => '.' as u8
        }).collect();
        print!("{:06X} : ",row_label);
        for byte in slice {
            print!("{:02X} ",byte);
        }
        for _blank in slice_end..slice_start+16 {
            print!("   ");
        }
        println!("| {}",String::from_utf8_lossy(&txt));
        slice_start += 16;
        if slice_end==block.len() {
            break;
        }
    }
}
