//! ### CP/M directory structures
//!
//! The fundamental structure is a 32-byte entry, also called an extent.
//! The directory is nothing other than a packed sequence of entries.
//! All information about file locations is contained in the extents, in
//! particular, there is no separate file index or volume bitmap.
//!
//! The raw entry is kept exactly as found on disk, the `Entry` is a decoded view
//! that also carries its place in the directory and the link to the next extent of the same file.

use std::io::Cursor;
use binrw::{BinRead,BinWrite};
use log::trace;
use super::types::*;
use crate::bios::geometry::Geometry;
use crate::DYNERR;

/// The 32-byte directory entry as stored on disk.
#[derive(BinRead,BinWrite,Copy,Clone,PartialEq,Eq,Debug)]
#[brw(little)]
pub struct RawEntry {
    /// value 0-15 identifies this as a file extent.  value 0xe5 means unused or deleted.
    pub user: u8,
    /// positive ASCII
    pub name: [u8;8],
    /// positive ASCII, high bits of the first two bytes are read-only and system flags
    pub typ: [u8;3],
    /// extent number modulo 32
    pub extent_low: u8,
    pub reserved: u8,
    /// extent number divided by 32
    pub extent_high: u8,
    /// records used in the last logical extent
    pub records: u8,
    /// 16 8-bit or 8 16-bit allocation numbers, 0 terminates the list
    pub alloc: [u8;16]
}

impl RawEntry {
    /// Blank entry belonging to user 0
    pub fn new() -> Self {
        Self {
            user: 0,
            name: [0x20;8],
            typ: [0x20;3],
            extent_low: 0,
            reserved: 0,
            extent_high: 0,
            records: 0,
            alloc: [0;16]
        }
    }
    pub fn from_bytes(dat: &[u8]) -> Result<Self,DYNERR> {
        let mut curs = Cursor::new(dat);
        Ok(Self::read(&mut curs)?)
    }
    pub fn to_bytes(&self) -> Result<Vec<u8>,DYNERR> {
        let mut curs = Cursor::new(Vec::new());
        self.write(&mut curs)?;
        Ok(curs.into_inner())
    }
    pub fn extent(&self) -> usize {
        self.extent_high as usize * 32 + self.extent_low as usize
    }
    pub fn set_extent(&mut self,extent: usize) {
        self.extent_low = (extent % 32) as u8;
        self.extent_high = (extent / 32) as u8;
    }
    /// Change only the lowest 7 bits (change name, keep flags)
    pub fn set_name(&mut self,name: [u8;8],typ: [u8;3]) {
        for i in 0..8 {
            self.name[i] = (name[i] & 0x7f) + (self.name[i] & 0x80);
        }
        for i in 0..3 {
            self.typ[i] = (typ[i] & 0x7f) + (self.typ[i] & 0x80);
        }
    }
    /// Get allocation number in `slot`, `ptr_size` is 1 or 2 bytes
    pub fn get_alloc(&self,slot: usize,ptr_size: usize) -> usize {
        match ptr_size {
            1 => self.alloc[slot] as usize,
            _ => u16::from_le_bytes([self.alloc[slot*2],self.alloc[slot*2+1]]) as usize
        }
    }
    /// Set allocation number in `slot`, `ptr_size` is 1 or 2 bytes
    pub fn set_alloc(&mut self,slot: usize,ptr_size: usize,val: usize) {
        match ptr_size {
            1 => self.alloc[slot] = val as u8,
            _ => {
                let bytes = u16::to_le_bytes(val as u16);
                self.alloc[slot*2] = bytes[0];
                self.alloc[slot*2+1] = bytes[1];
            }
        }
    }
}

/// Decoded directory entry.  The raw entry is authoritative, the other fields are derived from it
/// when the directory is loaded, and refreshed with `decode` after the raw entry changes.
#[derive(Clone,PartialEq,Eq,Debug)]
pub struct Entry {
    /// slot in the directory, 0-based
    pub index: usize,
    /// entry belongs to a file (user 0-15)
    pub valid: bool,
    pub raw: RawEntry,
    pub extent: usize,
    pub user: u8,
    /// name field as stored, including padding
    pub name: String,
    /// type field as stored without flags, including padding
    pub typ: String,
    pub read_only: bool,
    pub system: bool,
    /// `NAME.TYP`, or `NAME` if the type is blank, None if the entry is not valid
    pub full_name: Option<String>,
    pub records: usize,
    /// allocation numbers in use, in order
    pub allocs: Vec<usize>,
    /// index of the entry holding the next extent of this file
    pub next: Option<usize>
}

impl Entry {
    /// Decode the raw entry found in directory slot `index`
    pub fn decode(raw: RawEntry,index: usize,geom: &Geometry) -> Self {
        let name: String = raw.name.iter().map(|c| (c & 0x7f) as char).collect();
        let typ: String = raw.typ.iter().map(|c| (c & 0x7f) as char).collect();
        let valid = raw.user < USER_END;
        let full_name = match valid {
            true => {
                let mut s = name.trim_end().to_string();
                if !typ.starts_with(' ') {
                    s += ".";
                    s += typ.trim_end();
                }
                Some(s)
            },
            false => None
        };
        let mut allocs = Vec::new();
        if valid {
            let ptr_size = geom.ptr_size();
            for slot in 0..geom.alloc_slots() {
                match raw.get_alloc(slot,ptr_size) {
                    0 => break,
                    a => allocs.push(a)
                }
            }
        }
        trace!("entry {}: user {}, name {:?}, extent {}, {} allocations",index,raw.user,full_name,raw.extent(),allocs.len());
        Self {
            index,
            valid,
            raw,
            extent: raw.extent(),
            user: raw.user,
            name,
            typ,
            read_only: raw.typ[0] & 0x80 > 0,
            system: raw.typ[1] & 0x80 > 0,
            full_name,
            records: raw.records as usize,
            allocs,
            next: None
        }
    }
    /// Re-derive the decoded fields after changing `raw`, the chain link is kept
    pub fn refresh(&mut self,geom: &Geometry) {
        let next = self.next;
        *self = Self::decode(self.raw,self.index,geom);
        self.next = next;
    }
    /// With extents spanning two logical extents, an entry holding more than 4 allocations
    /// has a full logical extent ahead of the stored record count.
    fn is_extended(&self,geom: &Geometry) -> bool {
        geom.extended_extents() && self.allocs.len() > 4
    }
    /// Records of data held by this entry
    pub fn effective_records(&self,geom: &Geometry) -> usize {
        match self.is_extended(geom) {
            true => RECORD_MAX + self.records,
            false => self.records
        }
    }
    /// Is this the entry that starts a file
    pub fn is_first_extent(&self,geom: &Geometry) -> bool {
        self.extent==0 || (self.is_extended(geom) && self.extent==1)
    }
    /// `R` or `W`, followed by `S` or space
    pub fn attributes(&self) -> String {
        let mut ans = String::new();
        ans += match self.read_only { true => "R", false => "W" };
        ans += match self.system { true => "S", false => " " };
        ans
    }
}

#[test]
fn decode_sixteen_bit_allocations() {
    use crate::bios::geometry::HDD_5MB;
    let mut bytes = vec![0;32];
    bytes[0] = 3;
    bytes[1..9].copy_from_slice(b"ASM     ");
    bytes[9..12].copy_from_slice(&[b'C' | 0x80,b'O' | 0x80,b'M']);
    bytes[12] = 1;
    bytes[15] = 0x10;
    bytes[16..22].copy_from_slice(&[0x02,0x00,0x34,0x01,0x00,0x00]);
    let raw = RawEntry::from_bytes(&bytes).expect("could not decode");
    assert_eq!(raw.to_bytes().expect("could not encode"),bytes);
    let entry = Entry::decode(raw,5,&HDD_5MB);
    assert!(entry.valid);
    assert_eq!(entry.full_name,Some("ASM.COM".to_string()));
    assert_eq!(entry.attributes(),"RS");
    assert_eq!(entry.allocs,vec![2,0x134]);
    assert_eq!(entry.extent,1);
    assert!(!entry.is_first_extent(&HDD_5MB));
}

#[test]
fn deleted_entry_is_invalid() {
    use crate::bios::geometry::FDD_8IN;
    let raw = RawEntry::from_bytes(&[DELETED;32]).expect("could not decode");
    let entry = Entry::decode(raw,0,&FDD_8IN);
    assert!(!entry.valid);
    assert_eq!(entry.full_name,None);
    assert!(entry.allocs.is_empty());
}
