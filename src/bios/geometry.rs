//! ## Disk Geometry Module
//!
//! This contains the geometry descriptors for the Altair disk formats.  Unlike a CP/M disk parameter block,
//! the geometry also describes the raw sector layout, since several of the formats carry per-sector
//! headers, trailers, and checksums around the 128 byte record.
//!
//! There is no way to identify the format from the content of an image, so detection works by matching
//! the image length against each known geometry.  Two of the formats share a length; the first one
//! listed in `ALL` wins.

use crate::img;
use super::skew;
use log::{debug,error};

/// Size of a directory entry in bytes
pub const DIR_ENTRY_SIZE: usize = 32;
/// Largest directory any supported format can have
pub const MAX_DIRS: usize = 1024;
/// Largest allocation table any supported format can have
pub const MAX_ALLOCS: usize = 2048;
/// CP/M allows this many allocations per extent when pointers are 16 bits
const ALLOCS_PER_EXTENT: usize = 8;
/// Records tracked by one directory entry before the extent counter advances
const RECORDS_PER_LOGICAL_EXTENT: usize = 128;

/// How a logical sector is turned into a physical sector
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum SkewKind {
    /// table is 0-based, physical sector is the table entry plus 1
    Table,
    /// table is 1-based, and goes through the MITS controller re-skew on tracks 6 and up
    Mits8in
}

/// Checksum convention for sectors in a range of tracks
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum Checksum {
    None,
    /// sum of the data bytes, plus header bytes 2,3,5,6 on tracks 6 and up
    Altair8in
}

/// Byte offsets within a raw sector, valid for an inclusive range of tracks.
/// Offsets other than `data` only mean something if `csum_method` is not `None`.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct TrackOffsets {
    pub start_track: usize,
    pub end_track: usize,
    pub data: usize,
    pub track_nr: usize,
    pub sect_nr: usize,
    pub stop: usize,
    pub zero: usize,
    pub csum: usize,
    pub csum_method: Checksum
}

impl TrackOffsets {
    /// Layout with nothing but data, starting at `data`
    const fn plain(end_track: usize,data: usize) -> Self {
        Self {
            start_track: 0,
            end_track,
            data,
            track_nr: 0,
            sect_nr: 0,
            stop: 0,
            zero: 0,
            csum: 0,
            csum_method: Checksum::None
        }
    }
    pub fn contains(&self,track: usize) -> bool {
        track >= self.start_track && track <= self.end_track
    }
}

const MITS_8IN_OFFSETS: [TrackOffsets;2] = [
    TrackOffsets { start_track: 0, end_track: 5, data: 3, track_nr: 0, sect_nr: 0, stop: 131, zero: 133, csum: 132, csum_method: Checksum::None },
    TrackOffsets { start_track: 6, end_track: 77, data: 7, track_nr: 0, sect_nr: 1, stop: 135, zero: 136, csum: 4, csum_method: Checksum::Altair8in }
];

const MITS_8IN_8MB_OFFSETS: [TrackOffsets;2] = [
    TrackOffsets { start_track: 0, end_track: 5, data: 3, track_nr: 0, sect_nr: 0, stop: 131, zero: 133, csum: 132, csum_method: Checksum::None },
    TrackOffsets { start_track: 6, end_track: 2047, data: 7, track_nr: 0, sect_nr: 1, stop: 135, zero: 136, csum: 4, csum_method: Checksum::Altair8in }
];

const HDD_OFFSETS: [TrackOffsets;1] = [TrackOffsets::plain(405,0)];
const TARBELL_OFFSETS: [TrackOffsets;1] = [TrackOffsets::plain(76,0)];
const FDC_1_5MB_OFFSETS: [TrackOffsets;1] = [TrackOffsets::plain(148,0)];
const SIMH_OFFSETS: [TrackOffsets;1] = [TrackOffsets::plain(253,3)];

/// Physical and logical parameters of one disk format.
/// Derived quantities are computed on demand and never stored.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct Geometry {
    /// name used to select the format explicitly
    pub name: &'static str,
    /// exact length of an image file in this format
    pub image_size: usize,
    /// raw sector length including any header and trailer
    pub sector_len: usize,
    /// bytes of file data in each sector
    pub data_sector_len: usize,
    pub num_tracks: usize,
    /// system tracks, these precede allocation block 0
    pub reserved_tracks: usize,
    pub sectors_per_track: usize,
    /// size of an allocation block in bytes
    pub block_size: usize,
    /// number of directory entries
    pub dir_entries: usize,
    /// allocation blocks set aside for the directory, starting at block 0
    pub dir_allocs: usize,
    pub skew_kind: SkewKind,
    pub skew_table: &'static [usize],
    /// one or two raw sector layouts, each valid for a range of tracks
    pub offsets: &'static [TrackOffsets]
}

/// Standard MITS 8 inch floppy
pub const FDD_8IN: Geometry = Geometry {
    name: "FDD_8IN",
    image_size: 337568,
    sector_len: 137,
    data_sector_len: 128,
    num_tracks: 77,
    reserved_tracks: 2,
    sectors_per_track: 32,
    block_size: 2048,
    dir_entries: 64,
    dir_allocs: 2,
    skew_kind: SkewKind::Mits8in,
    skew_table: &skew::MITS_8IN,
    offsets: &MITS_8IN_OFFSETS
};

/// FDC+ 8MB "floppy", which uses the MITS 8 inch sector layout
pub const FDD_8IN_8MB: Geometry = Geometry {
    name: "FDD_8IN_8MB",
    image_size: 8978432,
    sector_len: 137,
    data_sector_len: 128,
    num_tracks: 2048,
    reserved_tracks: 2,
    sectors_per_track: 32,
    block_size: 4096,
    dir_entries: 512,
    dir_allocs: 4,
    skew_kind: SkewKind::Mits8in,
    skew_table: &skew::MITS_8IN,
    offsets: &MITS_8IN_8MB_OFFSETS
};

/// MITS 5MB hard disk
pub const HDD_5MB: Geometry = Geometry {
    name: "HDD_5MB",
    image_size: 4988928,
    sector_len: 128,
    data_sector_len: 128,
    num_tracks: 406,
    reserved_tracks: 1,
    sectors_per_track: 96,
    block_size: 4096,
    dir_entries: 256,
    dir_allocs: 2,
    skew_kind: SkewKind::Table,
    skew_table: &skew::MITS_HDD_5MB,
    offsets: &HDD_OFFSETS
};

/// MITS 5MB hard disk with a 1024 entry directory.
/// Same length as `HDD_5MB`, so it must be selected by name.
pub const HDD_5MB_1024: Geometry = Geometry {
    name: "HDD_5MB_1024",
    image_size: 4988928,
    sector_len: 128,
    data_sector_len: 128,
    num_tracks: 406,
    reserved_tracks: 1,
    sectors_per_track: 96,
    block_size: 4096,
    dir_entries: 1024,
    dir_allocs: 8,
    skew_kind: SkewKind::Table,
    skew_table: &skew::MITS_HDD_5MB,
    offsets: &HDD_OFFSETS
};

/// Tarbell 8 inch single density floppy
pub const TARBELL_FDD: Geometry = Geometry {
    name: "TARBELL_FDD",
    image_size: 256256,
    sector_len: 128,
    data_sector_len: 128,
    num_tracks: 77,
    reserved_tracks: 2,
    sectors_per_track: 26,
    block_size: 1024,
    dir_entries: 64,
    dir_allocs: 2,
    skew_kind: SkewKind::Table,
    skew_table: &skew::TARBELL,
    offsets: &TARBELL_OFFSETS
};

/// FDC+ 1.5MB floppy
pub const FDD_1_5MB: Geometry = Geometry {
    name: "FDD_1.5MB",
    image_size: 1525760,
    sector_len: 128,
    data_sector_len: 128,
    num_tracks: 149,
    reserved_tracks: 1,
    sectors_per_track: 80,
    block_size: 4096,
    dir_entries: 256,
    dir_allocs: 2,
    skew_kind: SkewKind::Table,
    skew_table: &skew::FDC_1_5MB,
    offsets: &FDC_1_5MB_OFFSETS
};

/// 8 inch floppy as formatted by the SIMH Altair simulator
pub const SIMH_FDD_8IN: Geometry = Geometry {
    name: "SIMH_FDD_8IN",
    image_size: 0x10fdc0,
    sector_len: 137,
    data_sector_len: 128,
    num_tracks: 254,
    reserved_tracks: 6,
    sectors_per_track: 32,
    block_size: 2048,
    dir_entries: 256,
    dir_allocs: 4,
    skew_kind: SkewKind::Mits8in,
    skew_table: &skew::SIMH_8IN,
    offsets: &SIMH_OFFSETS
};

/// All geometries in detection order
pub const ALL: [Geometry;7] = [FDD_8IN,HDD_5MB,HDD_5MB_1024,TARBELL_FDD,FDD_1_5MB,FDD_8IN_8MB,SIMH_FDD_8IN];

impl Geometry {
    /// Select a geometry by name, case insensitive
    pub fn from_name(name: &str) -> Result<Self,img::Error> {
        for geom in ALL {
            if geom.name.eq_ignore_ascii_case(name) {
                return Ok(geom);
            }
        }
        error!("unknown format {}, supported formats are {}",name,names().join(","));
        Err(img::Error::UnknownFormat)
    }
    /// Select a geometry by exact match of the image length
    pub fn detect(len: usize) -> Result<Self,img::Error> {
        for geom in ALL {
            if geom.image_size==len {
                debug!("image length {} matches {}",len,geom.name);
                return Ok(geom);
            }
        }
        error!("image length {} does not match any known format",len);
        Err(img::Error::UnknownFormat)
    }
    /// raw bytes in a track
    pub fn track_len(&self) -> usize {
        self.sector_len * self.sectors_per_track
    }
    /// allocation blocks on the disk, not counting system tracks
    pub fn total_allocs(&self) -> usize {
        (self.num_tracks - self.reserved_tracks) * self.sectors_per_track * self.data_sector_len / self.block_size
    }
    pub fn recs_per_alloc(&self) -> usize {
        self.block_size / self.data_sector_len
    }
    /// Records covered by one directory entry, rounded up to a multiple of 128
    pub fn recs_per_extent(&self) -> usize {
        (self.recs_per_alloc() * ALLOCS_PER_EXTENT + RECORDS_PER_LOGICAL_EXTENT - 1) / RECORDS_PER_LOGICAL_EXTENT * RECORDS_PER_LOGICAL_EXTENT
    }
    pub fn dirs_per_sector(&self) -> usize {
        self.data_sector_len / DIR_ENTRY_SIZE
    }
    pub fn dirs_per_alloc(&self) -> usize {
        self.block_size / DIR_ENTRY_SIZE
    }
    /// sectors occupied by the directory
    pub fn dir_sectors(&self) -> usize {
        self.dir_entries / self.dirs_per_sector()
    }
    /// size of an allocation pointer in a directory entry, 1 or 2 bytes
    pub fn ptr_size(&self) -> usize {
        match self.total_allocs() {
            n if n<=256 => 1,
            _ => 2
        }
    }
    /// number of allocation slots in a directory entry
    pub fn alloc_slots(&self) -> usize {
        16 / self.ptr_size()
    }
    /// Does this disk use extents that span two logical extents, in which
    /// case an entry with more than 4 allocations carries 128 extra records.
    pub fn extended_extents(&self) -> bool {
        self.recs_per_extent() > RECORDS_PER_LOGICAL_EXTENT
    }
    /// Sector layout for the given track.  If the track is outside every range the last layout is used.
    pub fn offsets(&self,track: usize) -> &TrackOffsets {
        for off in self.offsets {
            if off.contains(track) {
                return off;
            }
        }
        &self.offsets[self.offsets.len()-1]
    }
    /// true if any track carries the Altair sector header and checksum
    pub fn has_checksums(&self) -> bool {
        self.offsets.iter().any(|off| off.csum_method!=Checksum::None)
    }
    /// Map a 0-based logical sector to a 1-based physical sector on the given track
    pub fn skew(&self,track: usize,lsec: usize) -> usize {
        match self.skew_kind {
            SkewKind::Table => self.skew_table[lsec] + 1,
            SkewKind::Mits8in => skew::mits_reskew(track,self.skew_table[lsec])
        }
    }
    /// capacity of the data area in kilobytes
    pub fn capacity_kb(&self) -> usize {
        self.total_allocs() * self.block_size / 1024
    }
    /// Check that parameter dependencies are all satisfied.
    pub fn verify(&self) -> bool {
        if self.image_size != self.num_tracks * self.track_len() {
            debug!("{}: image size does not match track layout",self.name);
            return false;
        }
        if self.total_allocs() > MAX_ALLOCS {
            debug!("{}: block count exceeds maximum",self.name);
            return false;
        }
        if self.dir_entries > MAX_DIRS {
            debug!("{}: too many directory entries",self.name);
            return false;
        }
        if self.dir_entries * DIR_ENTRY_SIZE > self.dir_allocs * self.block_size {
            debug!("{}: directory does not fit in its blocks",self.name);
            return false;
        }
        if self.skew_table.len() < self.sectors_per_track {
            debug!("{}: skew table is too short",self.name);
            return false;
        }
        if self.block_size % self.data_sector_len != 0 || self.data_sector_len % DIR_ENTRY_SIZE != 0 {
            debug!("{}: block and sector sizes are not commensurate",self.name);
            return false;
        }
        for off in self.offsets {
            if off.data + self.data_sector_len > self.sector_len {
                debug!("{}: data overruns the sector",self.name);
                return false;
            }
        }
        return true;
    }
    /// Parameter dump as a JSON string, `indent` of None gives minified output
    pub fn to_json(&self,indent: Option<u16>) -> String {
        let obj = json::object! {
            format: self.name,
            sector_len: self.sector_len,
            data_len: self.data_sector_len,
            tracks: self.num_tracks,
            reserved_tracks: self.reserved_tracks,
            sectors_per_track: self.sectors_per_track,
            block_size: self.block_size,
            track_len: self.track_len(),
            recs_per_extent: self.recs_per_extent(),
            recs_per_alloc: self.recs_per_alloc(),
            dirs_per_sector: self.dirs_per_sector(),
            dirs_per_alloc: self.dirs_per_alloc(),
            dir_entries: json::object! { count: self.dir_entries, max: MAX_DIRS },
            allocations: json::object! { count: self.total_allocs(), max: MAX_ALLOCS },
            image_size: self.image_size
        };
        match indent {
            Some(spaces) => json::stringify_pretty(obj,spaces),
            None => json::stringify(obj)
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.name)
    }
}

/// names of all supported formats
pub fn names() -> Vec<&'static str> {
    ALL.iter().map(|g| g.name).collect()
}
