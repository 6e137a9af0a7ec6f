//! ## CP/M file system module
//!
//! The Altair disks use CP/M 2.2 style directories.  The key concept of the CP/M directory is the "extent,"
//! which is a subset of a file's data.  Indexing is in terms of 16K logical extents of 128 records,
//! but on disks with 16 bit allocation pointers one directory entry can hold two logical extents.
//! So we have three important units of quantization in the file system:
//! (i) records of 128 bytes, (ii) allocation blocks of 1K, 2K, or 4K (depending on disk type),
//! and (iii) directory extents of 128 or 256 records.
//!
//! Every change is written through to the image buffer as soon as it is made.  There is no rollback,
//! if the disk fills up in the middle of a write, the part of the file already written stays on the disk.

pub mod types;
pub mod directory;
pub mod table;
pub mod pack;
pub mod display;

use log::{trace,debug,info,error};
use types::*;
use directory::RawEntry;
use table::Directory;
use crate::bios::geometry::Geometry;
use crate::img;
use crate::img::altair::AltairImage;
use crate::{STDRESULT,DYNERR};

/// The primary interface for disk operations.
/// Owns the image buffer together with the directory decoded from it.
pub struct Disk {
    img: AltairImage,
    dir: Directory
}

impl Disk {
    /// Create a disk file system using the given image as storage.
    pub fn from_img(img: AltairImage,progress: Option<&mut dyn FnMut(usize)>) -> Result<Self,DYNERR> {
        if !img.geometry().verify() {
            error!("geometry {} is inconsistent",img.geometry());
            return Err(Box::new(img::Error::GeometryMismatch));
        }
        let dir = Directory::load(&img,progress)?;
        Ok(Self { img, dir })
    }
    /// Interpret an image buffer.  If `format` is None the geometry is detected from the buffer length.
    pub fn open(buf: &[u8],format: Option<&str>,progress: Option<&mut dyn FnMut(usize)>) -> Result<Self,DYNERR> {
        let geometry = match format {
            Some(name) => Geometry::from_name(name)?,
            None => Geometry::detect(buf.len())?
        };
        info!("using format {}",geometry);
        Self::from_img(AltairImage::from_bytes(buf,geometry),progress)
    }
    /// Create a freshly formatted disk
    pub fn format(geometry: Geometry) -> Result<Self,DYNERR> {
        Self::from_img(AltairImage::create(geometry)?,None)
    }
    /// Decode the directory again, this is the only way deleted files give back their space.
    pub fn reload(&mut self,progress: Option<&mut dyn FnMut(usize)>) -> STDRESULT {
        self.dir = Directory::load(&self.img,progress)?;
        Ok(())
    }
    pub fn geometry(&self) -> &Geometry {
        self.img.geometry()
    }
    pub fn directory(&self) -> &Directory {
        &self.dir
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.img.to_bytes()
    }
    fn find_or_fail(&self,name: &str) -> Result<usize,DYNERR> {
        match self.dir.find_by_name(name,None,false) {
            Some(idx) => Ok(idx),
            None => {
                error!("{} not found",name);
                Err(Box::new(Error::FileNotFound))
            }
        }
    }
    /// Replace an entry and write its directory sector
    fn commit_entry(&mut self,idx: usize,raw: RawEntry) -> STDRESULT {
        self.dir.set_raw(idx,raw);
        self.dir.save_entry(&mut self.img,idx)
    }
    /// Apply `f` to every extent of the file starting at `first`, saving each one
    fn modify_chain<F>(&mut self,first: usize,f: F) -> STDRESULT where F: Fn(&mut RawEntry) {
        for idx in self.dir.chain(first)? {
            let mut raw = self.dir.entry(idx).raw;
            f(&mut raw);
            self.commit_entry(idx,raw)?;
        }
        self.dir.sort_and_link();
        Ok(())
    }
    /// One record per file, in sorted order
    pub fn list(&self) -> Result<Vec<FileInfo>,DYNERR> {
        let geom = self.geometry();
        let mut ans = Vec::new();
        for idx in self.dir.sorted() {
            let e = self.dir.entry(*idx);
            if !e.valid || !e.is_first_extent(geom) {
                continue;
            }
            let mut records = 0;
            let mut allocs = 0;
            for x in self.dir.chain(*idx)? {
                let ext = self.dir.entry(x);
                records += ext.effective_records(geom);
                allocs += ext.allocs.len();
            }
            ans.push(FileInfo {
                name: e.name.trim_end().to_string(),
                typ: e.typ.trim_end().to_string(),
                bytes: records * geom.data_sector_len,
                kb: allocs * geom.block_size / 1024,
                user: e.user,
                attributes: e.attributes()
            });
        }
        Ok(ans)
    }
    /// free space in kilobytes, deleted files still count as used until the next reload
    pub fn free_kb(&self) -> usize {
        self.dir.free_allocs().len() * self.geometry().block_size / 1024
    }
    /// Formatted directory listing
    pub fn catalog(&self) -> Result<String,DYNERR> {
        let files = self.list()?;
        let used_kb: usize = files.iter().map(|f| f.kb).sum();
        let free_kb = self.free_kb();
        let totals = display::CatalogTotals {
            used_kb,
            total_kb: used_kb + free_kb,
            free_slots: self.dir.free_slots(),
            free_kb
        };
        display::catalog(&files,&totals)
    }
    /// Raw directory entries and free allocations
    pub fn raw_listing(&self) -> Result<String,DYNERR> {
        display::raw_listing(&self.dir)
    }
    /// Names of all files matching a wildcard pattern, in sorted order
    pub fn glob(&self,pattern: &str) -> Vec<String> {
        let mut ans = Vec::new();
        let mut after = None;
        while let Some(idx) = self.dir.find_by_name(pattern,after,true) {
            if let Some(name) = &self.dir.entry(idx).full_name {
                ans.push(name.clone());
            }
            after = Some(idx);
        }
        debug!("pattern {} matched {} files",pattern,ans.len());
        ans
    }
    /// Copy a file out of the image.  Trailing filler is trimmed, if nothing remains the result is `None`.
    /// The progress callback receives the number of bytes read so far.
    pub fn read_file(&self,name: &str,mode: TransferMode,mut progress: Option<&mut dyn FnMut(usize)>) -> Result<Option<Vec<u8>>,DYNERR> {
        let first = self.find_or_fail(name)?;
        let chain = self.dir.chain(first)?;
        let geom = *self.geometry();
        let rpa = geom.recs_per_alloc();
        let mut mode = mode;
        let mut ans: Vec<u8> = Vec::new();
        for (n,idx) in chain.iter().enumerate() {
            let e = self.dir.entry(*idx);
            let recs = e.effective_records(&geom);
            let last_extent = n+1==chain.len();
            trace!("extent {} has {} records",e.extent,recs);
            for rec in 0..recs {
                let alloc = match e.allocs.get(rec / rpa) {
                    Some(a) => *a,
                    None => break
                };
                let mut buf = self.img.read_record(alloc,rec)?;
                if mode==TransferMode::Auto && buf.iter().any(|b| *b > 0x7f) {
                    debug!("found 8-bit data, switching to binary");
                    mode = TransferMode::Binary;
                }
                if mode!=TransferMode::Binary && last_extent && rec+1==recs {
                    if let Some(pos) = buf.iter().position(|b| *b==EOF_MARK) {
                        buf.truncate(pos);
                    }
                }
                ans.append(&mut buf);
                if let Some(f) = progress.as_mut() {
                    f(ans.len());
                }
            }
        }
        while let Some(b) = ans.last() {
            if !TRAILING_FILL.contains(b) {
                break;
            }
            ans.pop();
        }
        if ans.is_empty() {
            info!("{} has no data",name);
            return Ok(None);
        }
        Ok(Some(ans))
    }
    /// Copy data into a new file.  The name is sanitized first, and the name actually used is returned.
    /// If the disk fills up, the records already written are kept and `NoSpace` reports their byte count.
    /// The progress callback receives the number of bytes written so far.
    pub fn write_file(&mut self,name: &str,dat: &[u8],mut progress: Option<&mut dyn FnMut(usize)>) -> Result<String,DYNERR> {
        let cpm_name = pack::sanitize(name);
        if cpm_name.is_empty() {
            error!("cannot make a CP/M name from {}",name);
            return Err(Box::new(Error::InvalidName));
        }
        if self.dir.find_by_name(&cpm_name,None,false).is_some() {
            error!("{} already exists, overwriting is not allowed",cpm_name);
            return Err(Box::new(Error::FileExists));
        }
        let (base,typ) = pack::split_name(&cpm_name);
        let geom = *self.geometry();
        let dlen = geom.data_sector_len;
        let rpa = geom.recs_per_alloc();
        let rpe = geom.recs_per_extent();
        let ptr = geom.ptr_size();
        let nrecs = (dat.len() + dlen - 1) / dlen;
        debug!("write {} bytes, {} records, to {}",dat.len(),nrecs,cpm_name);
        // CP/M allows an empty file, it takes an entry but no blocks
        if nrecs==0 {
            let idx = match self.dir.find_free_slot() {
                Some(idx) => idx,
                None => {
                    error!("directory is full");
                    return Err(Box::new(Error::NoSpace(0)));
                }
            };
            let mut raw = RawEntry::new();
            raw.set_name(base,typ);
            self.commit_entry(idx,raw)?;
            self.dir.sort_and_link();
            return Ok(cpm_name);
        }
        let mut curr: Option<(usize,RawEntry)> = None;
        let mut nr_allocs = 0;
        let mut nr_extents = 0;
        let mut written = 0;
        let mut full = false;
        for r in 0..nrecs {
            if r % rpe == 0 {
                if let Some((idx,raw)) = curr.take() {
                    self.commit_entry(idx,raw)?;
                }
                match self.dir.find_free_slot() {
                    Some(idx) => {
                        let mut raw = RawEntry::new();
                        raw.set_name(base,typ);
                        curr = Some((idx,raw));
                        nr_allocs = 0;
                    },
                    None => {
                        error!("directory is full");
                        full = true;
                        break;
                    }
                }
            }
            let Some((_,raw)) = curr.as_mut() else {
                break;
            };
            if r % rpa == 0 {
                match self.dir.find_free_alloc() {
                    Some(a) => {
                        raw.set_alloc(nr_allocs,ptr,a);
                        nr_allocs += 1;
                    },
                    None => {
                        error!("no free allocation blocks");
                        full = true;
                        break;
                    }
                }
            }
            raw.records = ((r % RECORD_MAX) + 1) as u8;
            raw.set_extent(nr_extents);
            let alloc = raw.get_alloc((r % rpe) / rpa,ptr);
            let end = usize::min((r+1)*dlen,dat.len());
            self.img.write_record(alloc,r,&dat[r*dlen..end])?;
            written = end;
            if (r+1) % RECORD_MAX == 0 {
                nr_extents += 1;
            }
            if let Some(f) = progress.as_mut() {
                f(written);
            }
        }
        if let Some((idx,raw)) = curr {
            if !full || raw.get_alloc(0,ptr) > 0 {
                self.commit_entry(idx,raw)?;
            }
        }
        self.dir.sort_and_link();
        if full {
            return Err(Box::new(Error::NoSpace(written)));
        }
        Ok(cpm_name)
    }
    /// Delete a file.  The blocks stay marked as used until the directory is reloaded.
    pub fn erase(&mut self,name: &str) -> STDRESULT {
        let first = self.find_or_fail(name)?;
        self.modify_chain(first,|raw| raw.user = DELETED)
    }
    /// Rename a file, the new name is sanitized, attributes are kept
    pub fn rename(&mut self,old_name: &str,new_name: &str) -> Result<String,DYNERR> {
        let first = self.find_or_fail(old_name)?;
        let cpm_name = pack::sanitize(new_name);
        if cpm_name.is_empty() {
            error!("cannot make a CP/M name from {}",new_name);
            return Err(Box::new(Error::InvalidName));
        }
        // a file may be renamed to a case variant of itself
        match self.dir.find_by_name(&cpm_name,None,false) {
            Some(idx) if idx!=first => {
                error!("{} already exists",cpm_name);
                return Err(Box::new(Error::FileExists));
            },
            _ => {}
        }
        let (base,typ) = pack::split_name(&cpm_name);
        self.modify_chain(first,|raw| raw.set_name(base,typ))?;
        Ok(cpm_name)
    }
    /// Change the user number of a file
    pub fn chown(&mut self,name: &str,user: u8) -> STDRESULT {
        if user >= USER_END {
            error!("user must be 0-{}",USER_END-1);
            return Err(Box::new(Error::InvalidOwner(user)));
        }
        let first = self.find_or_fail(name)?;
        self.modify_chain(first,|raw| raw.user = user)
    }
}

#[test]
fn nearly_full_disk_keeps_partial_file() {
    use crate::bios::geometry::TARBELL_FDD;
    let mut disk = Disk::format(TARBELL_FDD).expect("format failed");
    let free = disk.free_kb() * 1024;
    let dat = vec![0x55;free + 4096];
    match disk.write_file("big.dat",&dat,None) {
        Err(e) => match e.downcast_ref::<Error>() {
            Some(Error::NoSpace(n)) => assert_eq!(*n,free),
            _ => panic!("wrong error {}",e)
        },
        Ok(_) => panic!("write should have failed")
    }
    let back = disk.read_file("BIG.DAT",TransferMode::Binary,None).expect("read failed").expect("no data");
    assert_eq!(back.len(),free);
    assert_eq!(disk.free_kb(),0);
}
