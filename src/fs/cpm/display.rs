//! ### Directory displays
//!
//! Builds the formatted catalog and the raw entry dump as strings, the caller decides where they go.

use std::fmt::Write;
use super::types::FileInfo;
use super::table::Directory;
use crate::DYNERR;

/// Free allocations per line in the raw listing
const FREE_PER_LINE: usize = 16;

/// Summary figures for the catalog footer
pub struct CatalogTotals {
    pub used_kb: usize,
    /// used plus free, so the directory blocks are left out
    pub total_kb: usize,
    pub free_slots: usize,
    pub free_kb: usize
}

/// Formatted listing with one row per file
pub fn catalog(files: &[FileInfo],totals: &CatalogTotals) -> Result<String,DYNERR> {
    let mut ans = String::new();
    writeln!(ans,"Name     Ext   Length Used U At")?;
    for f in files {
        writeln!(ans,"{:8} {:3} {:7}B {:3}K {} {}",f.name,f.typ,f.bytes,f.kb,f.user,f.attributes)?;
    }
    writeln!(ans,"{} file(s), occupying {}K of {}K total capacity",files.len(),totals.used_kb,totals.total_kb)?;
    writeln!(ans,"{} directory entries and {}K bytes remain",totals.free_slots,totals.free_kb)?;
    Ok(ans)
}

/// Every live entry in physical order, followed by the free allocation blocks
pub fn raw_listing(dir: &Directory) -> Result<String,DYNERR> {
    let mut ans = String::new();
    writeln!(ans,"IDX:U:FILENAME:TYP:AT:EXT:REC:[ALLOCATIONS]")?;
    for e in dir.entries().iter().filter(|e| e.valid) {
        let allocs: Vec<String> = e.allocs.iter().map(|a| a.to_string()).collect();
        writeln!(ans,"{:03}:{}:{:8}:{:3}:{}:{:03}:{:03}:[{}]",
            e.index,e.user,e.name,e.typ,e.attributes(),e.extent,e.records,allocs.join(","))?;
    }
    writeln!(ans,"FREE ALLOCATIONS:")?;
    for line in dir.free_allocs().chunks(FREE_PER_LINE) {
        let nums: Vec<String> = line.iter().map(|a| format!("{:03}",a)).collect();
        writeln!(ans,"{}",nums.join(" "))?;
    }
    Ok(ans)
}

#[test]
fn catalog_rows() {
    let files = vec![FileInfo {
        name: "ASM".to_string(),
        typ: "COM".to_string(),
        bytes: 8192,
        kb: 8,
        user: 0,
        attributes: "W ".to_string()
    }];
    let totals = CatalogTotals { used_kb: 8, total_kb: 296, free_slots: 63, free_kb: 288 };
    let listing = catalog(&files,&totals).expect("format failed");
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[1],"ASM      COM    8192B   8K 0 W ");
    assert_eq!(lines[0].len(),lines[1].trim_end().len() + 1);
    assert_eq!(lines[2],"1 file(s), occupying 8K of 296K total capacity");
}

#[test]
fn raw_rows() {
    use crate::bios::geometry::FDD_8IN;
    use crate::img::altair::AltairImage;
    use super::directory::RawEntry;
    use super::pack;
    let img = AltairImage::create(FDD_8IN).expect("format failed");
    let mut dir = Directory::load(&img,None).expect("load failed");
    let mut raw = RawEntry::new();
    let (name,typ) = pack::split_name("ASM.COM");
    raw.set_name(name,typ);
    raw.records = 5;
    raw.set_alloc(0,1,2);
    dir.set_raw(12,raw);
    dir.sort_and_link();
    let listing = raw_listing(&dir).expect("format failed");
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[1],"012:0:ASM     :COM:W :000:005:[2]");
    assert_eq!(lines[2],"FREE ALLOCATIONS:");
    assert!(lines[3].starts_with("003 004 005"));
}
