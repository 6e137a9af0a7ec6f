//! # Disk Image Module
//!
//! An Altair disk image is a flat dump of raw sectors, track by track, with no container metadata.
//! The raw sector may wrap the 128 byte record in a header and trailer, as the MITS 8 inch controller does.
//! The `altair` submodule holds the image buffer and does all the translation from
//! CP/M allocation blocks and records to byte offsets within the buffer.
//!
//! ## Sector Skews
//!
//! The actual skew tables are maintained separately in `bios::skew`, and are selected
//! through the geometry in `bios::geometry`.  The file system asks for a record in terms of
//! an allocation block and a record index, which is transformed into a track and a logical sector,
//! which is further transformed into a physical sector and finally a byte offset.

pub mod altair;

use std::fmt;

/// Enumerates disk image errors.  The `Display` trait will print equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("unknown disk format")]
    UnknownFormat,
    #[error("image is too short for the requested sector")]
    CorruptImage,
    #[error("geometric coordinate out of range")]
    GeometryMismatch
}

/// Where a record lives in the image
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct Location {
    pub track: usize,
    /// physical sector, 1-based
    pub sector: usize,
    /// offset of the record data from the start of the image
    pub offset: usize
}

impl fmt::Display for Location {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"track {}, sector {}, offset {:#x}",self.track,self.sector,self.offset)
    }
}

/// Pad or truncate a slice to the given length
pub fn quantize_block(src: &[u8],quantum: usize,fill: u8) -> Vec<u8> {
    let mut padded: Vec<u8> = Vec::new();
    for i in 0..quantum {
        if i<src.len() {
            padded.push(src[i])
        } else {
            padded.push(fill);
        }
    }
    return padded;
}
