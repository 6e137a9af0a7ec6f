//! ### Directory and allocation table
//!
//! The whole directory is decoded into an arena of entries indexed by physical slot.
//! A sorted view over the arena groups the extents of each file together, and each extent
//! points to the next one by index.  The allocation bitmap is derived from the entries at load time.
//!
//! Deleting a file does not clear its bits in the bitmap, the space only comes back when the
//! directory is loaded again.

use bit_vec::BitVec;
use log::{trace,debug,warn,error};
use super::types::*;
use super::directory::*;
use super::pack;
use crate::bios::geometry::{Geometry,DIR_ENTRY_SIZE};
use crate::img::altair::AltairImage;
use crate::{STDRESULT,DYNERR};

pub struct Directory {
    geometry: Geometry,
    /// indexed by physical slot
    entries: Vec<Entry>,
    /// physical slots, named entries by (name,type,extent), then the rest in physical order
    sorted: Vec<usize>,
    allocs: BitVec
}

impl Directory {
    /// Read and decode every directory sector.  The progress callback receives the
    /// byte position within the directory after each sector.
    pub fn load(img: &AltairImage,mut progress: Option<&mut dyn FnMut(usize)>) -> Result<Self,DYNERR> {
        let geometry = *img.geometry();
        let rpa = geometry.recs_per_alloc();
        let dps = geometry.dirs_per_sector();
        let mut entries = Vec::new();
        for sec in 0..geometry.dir_sectors() {
            let buf = img.read_record(sec / rpa,sec % rpa)?;
            for slot in 0..dps {
                let raw = RawEntry::from_bytes(&buf[slot*DIR_ENTRY_SIZE..(slot+1)*DIR_ENTRY_SIZE])?;
                entries.push(Entry::decode(raw,entries.len(),&geometry));
            }
            if let Some(f) = progress.as_mut() {
                f((sec + 1) * geometry.data_sector_len);
            }
        }
        let mut ans = Self {
            geometry,
            entries,
            sorted: Vec::new(),
            allocs: BitVec::from_elem(geometry.total_allocs(),false)
        };
        for i in 0..geometry.dir_allocs {
            ans.allocs.set(i,true);
        }
        for i in 0..ans.entries.len() {
            let list = ans.entries[i].allocs.clone();
            for a in list {
                ans.mark_used(a,i);
            }
        }
        ans.sort_and_link();
        debug!("loaded {} entries, {} in use, {} free allocations",ans.entries.len(),
            ans.entries.len()-ans.free_slots(),ans.free_allocs().len());
        Ok(ans)
    }
    fn mark_used(&mut self,alloc: usize,idx: usize) {
        match alloc < self.allocs.len() {
            true => self.allocs.set(alloc,true),
            false => warn!("entry {} has allocation {} beyond the end of the disk",idx,alloc)
        }
    }
    /// Rebuild the sorted view and the chain links from the current entries.
    /// The allocation bitmap is not touched.
    pub fn sort_and_link(&mut self) {
        let mut named: Vec<usize> = (0..self.entries.len()).filter(|i| self.entries[*i].full_name.is_some()).collect();
        named.sort_by(|a,b| {
            let (x,y) = (&self.entries[*a],&self.entries[*b]);
            (&x.name,&x.typ,x.extent).cmp(&(&y.name,&y.typ,y.extent))
        });
        let rest = (0..self.entries.len()).filter(|i| self.entries[*i].full_name.is_none());
        self.sorted = named.into_iter().chain(rest).collect();
        for e in self.entries.iter_mut() {
            e.next = None;
        }
        let mut links = 0;
        for w in self.sorted.windows(2) {
            let (curr,next) = (w[0],w[1]);
            if self.entries[curr].valid && self.entries[next].valid && self.entries[curr].full_name==self.entries[next].full_name {
                self.entries[curr].next = Some(next);
                links += 1;
            }
        }
        debug!("linked {} extents",links);
    }
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Entry by physical slot, panics if out of range
    pub fn entry(&self,idx: usize) -> &Entry {
        &self.entries[idx]
    }
    /// Entries in physical order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
    /// Physical slots in sorted order
    pub fn sorted(&self) -> &[usize] {
        &self.sorted
    }
    /// Replace the raw entry in slot `idx` and mark its allocations used.
    /// The sorted view is not updated, call `sort_and_link` when done.
    pub fn set_raw(&mut self,idx: usize,raw: RawEntry) {
        self.entries[idx].raw = raw;
        self.entries[idx].refresh(&self.geometry);
        let list = self.entries[idx].allocs.clone();
        for a in list {
            self.mark_used(a,idx);
        }
    }
    /// Write the sector holding slot `idx` back to the image
    pub fn save_entry(&self,img: &mut AltairImage,idx: usize) -> STDRESULT {
        let dps = self.geometry.dirs_per_sector();
        let rpa = self.geometry.recs_per_alloc();
        let sec = idx / dps;
        let mut buf = Vec::new();
        for slot in sec*dps..(sec+1)*dps {
            buf.append(&mut self.entries[slot].raw.to_bytes()?);
        }
        trace!("save directory sector {} for entry {}",sec,idx);
        img.write_record(sec / rpa,sec % rpa,&buf)
    }
    /// Search the sorted view, starting after slot `after`, for the first extent of a matching file.
    /// Returns the physical slot.
    pub fn find_by_name(&self,name: &str,after: Option<usize>,wildcards: bool) -> Option<usize> {
        let start = match after {
            Some(prev) => match self.sorted.iter().position(|i| *i==prev) {
                Some(pos) => pos + 1,
                None => return None
            },
            None => 0
        };
        for idx in &self.sorted[start..] {
            let e = &self.entries[*idx];
            if !e.valid || !e.is_first_extent(&self.geometry) {
                continue;
            }
            if let Some(full_name) = &e.full_name {
                let matched = match wildcards {
                    true => pack::filename_equals(name,full_name),
                    false => name.trim_end_matches('.').eq_ignore_ascii_case(full_name)
                };
                if matched {
                    return Some(*idx);
                }
            }
        }
        None
    }
    /// first unused slot in physical order
    pub fn find_free_slot(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.valid)
    }
    /// Claim the first free allocation block
    pub fn find_free_alloc(&mut self) -> Option<usize> {
        let ans = self.allocs.iter().position(|used| !used)?;
        self.allocs.set(ans,true);
        trace!("claim allocation {}",ans);
        Some(ans)
    }
    pub fn is_alloc_used(&self,alloc: usize) -> bool {
        self.allocs.get(alloc).unwrap_or(true)
    }
    pub fn free_allocs(&self) -> Vec<usize> {
        (0..self.allocs.len()).filter(|a| !self.allocs[*a]).collect()
    }
    pub fn free_slots(&self) -> usize {
        self.entries.iter().filter(|e| !e.valid).count()
    }
    /// Physical slots of every extent of the file starting at `first`
    pub fn chain(&self,first: usize) -> Result<Vec<usize>,DYNERR> {
        let mut ans = Vec::new();
        let mut curr = Some(first);
        while let Some(idx) = curr {
            if idx >= self.entries.len() || ans.len() >= self.entries.len() {
                error!("extent chain starting at {} is broken",first);
                return Err(Box::new(Error::CorruptImage));
            }
            ans.push(idx);
            curr = self.entries[idx].next;
        }
        Ok(ans)
    }
}

#[cfg(test)]
fn test_dir() -> (AltairImage,Directory) {
    use crate::bios::geometry::FDD_8IN;
    let img = AltairImage::create(FDD_8IN).expect("format failed");
    let dir = Directory::load(&img,None).expect("load failed");
    (img,dir)
}

#[cfg(test)]
fn test_entry(name: &str,extent: usize,alloc: usize) -> RawEntry {
    let mut raw = RawEntry::new();
    let (n,t) = pack::split_name(name);
    raw.set_name(n,t);
    raw.set_extent(extent);
    raw.records = 128;
    raw.set_alloc(0,1,alloc);
    raw
}

#[test]
fn fresh_directory() {
    let (_img,dir) = test_dir();
    assert_eq!(dir.len(),64);
    assert_eq!(dir.free_slots(),64);
    assert!(dir.is_alloc_used(0));
    assert!(dir.is_alloc_used(1));
    assert_eq!(dir.free_allocs().len(),148);
    assert_eq!(dir.find_free_slot(),Some(0));
}

#[test]
fn chains_follow_extents() {
    let (mut img,mut dir) = test_dir();
    dir.set_raw(3,test_entry("B.TXT",1,5));
    dir.set_raw(7,test_entry("A.COM",0,6));
    dir.set_raw(9,test_entry("B.TXT",0,4));
    dir.sort_and_link();
    for idx in [3,7,9] {
        dir.save_entry(&mut img,idx).expect("save failed");
    }
    assert_eq!(&dir.sorted()[0..3],&[7,9,3]);
    assert_eq!(dir.find_by_name("b.txt",None,false),Some(9));
    assert_eq!(dir.chain(9).expect("bad chain"),vec![9,3]);
    assert_eq!(dir.find_by_name("*.*",Some(7),true),Some(9));
    assert_eq!(dir.find_by_name("*.*",Some(9),true),None);
    // reload gives the same picture
    let mut again = Directory::load(&img,None).expect("reload failed");
    assert_eq!(again.sorted(),dir.sorted());
    assert_eq!(again.entries(),dir.entries());
    assert_eq!(again.find_free_alloc(),Some(2));
}
