// test of CP/M file operations on Altair disk images
use altairdsk::bios::geometry::{self,Geometry};
use altairdsk::fs::cpm::Disk;
use altairdsk::fs::cpm::types::{Error,TransferMode};

/// Data that does not end with any of the bytes trimmed on reading
fn test_data(len: usize) -> Vec<u8> {
    let mut ans: Vec<u8> = (0..len).map(|i| ((i * 7 + 3) % 251) as u8).collect();
    if let Some(last) = ans.last_mut() {
        *last = b'Z';
    }
    ans
}

fn cpm_error(e: &Box<dyn std::error::Error>) -> &Error {
    e.downcast_ref::<Error>().expect("not a CP/M error")
}

fn round_trip(geom: Geometry) {
    let mut disk = Disk::format(geom).expect("format failed");
    let rec = geom.data_sector_len;
    let sizes = [
        ("EMPTY.DAT",0),
        ("ONE.DAT",1),
        ("SECTOR.DAT",rec),
        ("ALLOC.DAT",geom.block_size),
        ("EXTENT.DAT",geom.recs_per_extent() * rec),
        ("MULTI.DAT",2 * geom.recs_per_extent() * rec + geom.block_size + 5)
    ];
    for (name,len) in sizes {
        let dat = test_data(len);
        disk.write_file(name,&dat,None).expect("write failed");
        let back = disk.read_file(name,TransferMode::Binary,None).expect("read failed");
        match len {
            0 => assert_eq!(back,None,"{}: {}",geom,name),
            _ => assert_eq!(back,Some(dat),"{}: {}",geom,name)
        }
    }
    // everything is still there after reopening the buffer
    let again = Disk::open(&disk.to_bytes(),Some(geom.name),None).expect("reopen failed");
    let back = again.read_file("MULTI.DAT",TransferMode::Binary,None).expect("read failed");
    assert_eq!(back,Some(test_data(sizes[5].1)));
}

#[test]
fn round_trip_8in() {
    round_trip(geometry::FDD_8IN);
}

#[test]
fn round_trip_hdd() {
    round_trip(geometry::HDD_5MB);
}

#[test]
fn round_trip_tarbell() {
    round_trip(geometry::TARBELL_FDD);
}

#[test]
fn round_trip_simh() {
    round_trip(geometry::SIMH_FDD_8IN);
}

#[test]
fn round_trip_1_5mb() {
    round_trip(geometry::FDD_1_5MB);
}

#[test]
fn extended_extent_encoding() {
    let mut disk = Disk::format(geometry::HDD_5MB).expect("format failed");
    disk.write_file("X.BIN",&test_data(129*128),None).expect("write failed");
    let live: Vec<_> = disk.directory().entries().iter().filter(|e| e.valid).collect();
    assert_eq!(live.len(),1);
    assert_eq!(live[0].extent,1);
    assert_eq!(live[0].records,1);
    assert_eq!(live[0].allocs.len(),5);
    assert!(live[0].is_first_extent(disk.geometry()));
    assert_eq!(live[0].effective_records(disk.geometry()),129);
}

#[test]
fn extents_chain_in_order() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    // 391 records, 4 extents of 128 records
    disk.write_file("BIG.TXT",&test_data(50000),None).expect("write failed");
    let first = disk.directory().find_by_name("BIG.TXT",None,false).expect("not found");
    let chain = disk.directory().chain(first).expect("bad chain");
    let extents: Vec<usize> = chain.iter().map(|i| disk.directory().entry(*i).extent).collect();
    assert_eq!(extents,vec![0,1,2,3]);
    assert_eq!(disk.directory().entry(chain[3]).records,391 - 3*128);
}

#[test]
fn text_modes() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    disk.write_file("T.TXT",b"HELLO\r\n\x1aJUNK",None).expect("write failed");
    let txt = disk.read_file("T.TXT",TransferMode::Text,None).expect("read failed");
    assert_eq!(txt,Some(b"HELLO\r\n".to_vec()));
    let auto = disk.read_file("t.txt",TransferMode::Auto,None).expect("read failed");
    assert_eq!(auto,Some(b"HELLO\r\n".to_vec()));
    let bin = disk.read_file("T.TXT",TransferMode::Binary,None).expect("read failed");
    assert_eq!(bin,Some(b"HELLO\r\n\x1aJUNK".to_vec()));
    disk.write_file("B.COM",&[0x41,0x1a,0xc3],None).expect("write failed");
    let auto = disk.read_file("B.COM",TransferMode::Auto,None).expect("read failed");
    assert_eq!(auto,Some(vec![0x41,0x1a,0xc3]));
}

#[test]
fn names_are_sanitized() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    let name = disk.write_file("m80......com",&test_data(10),None).expect("write failed");
    assert_eq!(name,"M80.COM");
    assert!(disk.read_file("M80.COM",TransferMode::Binary,None).is_ok());
    match disk.write_file("M80.COM",&test_data(10),None) {
        Err(e) => assert!(matches!(cpm_error(&e),Error::FileExists)),
        Ok(_) => panic!("overwrite should fail")
    }
    match disk.write_file("***",&test_data(10),None) {
        Err(e) => assert!(matches!(cpm_error(&e),Error::InvalidName)),
        Ok(_) => panic!("empty name should fail")
    }
}

#[test]
fn directory_full() {
    let mut disk = Disk::format(geometry::TARBELL_FDD).expect("format failed");
    for i in 0..64 {
        disk.write_file(&format!("F{}.TXT",i),&[],None).expect("write failed");
    }
    match disk.write_file("ONEMORE.TXT",&test_data(300),None) {
        Err(e) => assert!(matches!(cpm_error(&e),Error::NoSpace(0))),
        Ok(_) => panic!("directory should be full")
    }
}

#[test]
fn erase_keeps_blocks_until_reload() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    let empty_kb = disk.free_kb();
    disk.write_file("GONE.DAT",&test_data(5000),None).expect("write failed");
    let used_kb = disk.free_kb();
    assert_eq!(empty_kb - used_kb,6);
    disk.erase("GONE.DAT").expect("erase failed");
    match disk.read_file("GONE.DAT",TransferMode::Binary,None) {
        Err(e) => assert!(matches!(cpm_error(&e),Error::FileNotFound)),
        Ok(_) => panic!("file should be gone")
    }
    assert_eq!(disk.free_kb(),used_kb);
    disk.reload(None).expect("reload failed");
    assert_eq!(disk.free_kb(),empty_kb);
}

#[test]
fn rename_and_chown() {
    let mut disk = Disk::format(geometry::HDD_5MB).expect("format failed");
    disk.write_file("OLD.TXT",&test_data(40000),None).expect("write failed");
    disk.write_file("OTHER.TXT",&test_data(10),None).expect("write failed");
    assert_eq!(disk.rename("old.txt","new.txt").expect("rename failed"),"NEW.TXT");
    assert!(disk.read_file("OLD.TXT",TransferMode::Binary,None).is_err());
    assert_eq!(disk.read_file("NEW.TXT",TransferMode::Binary,None).expect("read failed"),Some(test_data(40000)));
    assert_eq!(disk.rename("NEW.TXT","New.Txt").expect("rename to same name failed"),"NEW.TXT");
    match disk.rename("NEW.TXT","OTHER.TXT") {
        Err(e) => assert!(matches!(cpm_error(&e),Error::FileExists)),
        Ok(_) => panic!("rename onto existing file should fail")
    }
    disk.chown("NEW.TXT",3).expect("chown failed");
    let files = disk.list().expect("list failed");
    let f = files.iter().find(|f| f.name=="NEW").expect("not listed");
    assert_eq!(f.user,3);
    match disk.chown("NEW.TXT",16) {
        Err(e) => assert!(matches!(cpm_error(&e),Error::InvalidOwner(16))),
        Ok(_) => panic!("user 16 should fail")
    }
}

#[test]
fn listing_and_glob() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    disk.write_file("A.COM",&test_data(300),None).expect("write failed");
    disk.write_file("C.TXT",&test_data(300),None).expect("write failed");
    disk.write_file("B.COM",&test_data(3000),None).expect("write failed");
    assert_eq!(disk.glob("*.COM"),vec!["A.COM","B.COM"]);
    assert_eq!(disk.glob("?.*").len(),3);
    let files = disk.list().expect("list failed");
    assert_eq!(files.len(),3);
    assert_eq!(files[0].name,"A");
    assert_eq!(files[0].typ,"COM");
    assert_eq!(files[0].bytes,384);
    assert_eq!(files[0].kb,2);
    assert_eq!(files[0].attributes,"W ");
    let cat = disk.catalog().expect("catalog failed");
    assert!(cat.contains("3 file(s), occupying 8K of 296K total capacity"));
    assert!(cat.contains("61 directory entries and 288K bytes remain"));
    let raw = disk.raw_listing().expect("raw listing failed");
    assert!(raw.starts_with("IDX:U:FILENAME:TYP:AT:EXT:REC:[ALLOCATIONS]"));
    assert!(raw.contains("FREE ALLOCATIONS:"));
}

#[test]
fn reload_is_deterministic() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    for name in ["Z.DAT","A.DAT","M.DAT"] {
        disk.write_file(name,&test_data(20000),None).expect("write failed");
    }
    disk.erase("M.DAT").expect("erase failed");
    let bytes = disk.to_bytes();
    let d1 = Disk::open(&bytes,None,None).expect("open failed");
    let d2 = Disk::open(&bytes,None,None).expect("open failed");
    assert_eq!(d1.directory().sorted(),d2.directory().sorted());
    assert_eq!(d1.directory().entries(),d2.directory().entries());
    assert_eq!(d1.glob("*.*"),vec!["A.DAT","Z.DAT"]);
}

#[test]
fn checksums_survive_writes() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    disk.write_file("SUM.DAT",&test_data(30000),None).expect("write failed");
    let dat = disk.to_bytes();
    for track in 6..77 {
        for sec in 0..32 {
            let start = (track * 32 + sec) * 137;
            let mut sum: u8 = 0;
            for i in [2,3,5,6] {
                sum = sum.wrapping_add(dat[start+i]);
            }
            for i in 7..135 {
                sum = sum.wrapping_add(dat[start+i]);
            }
            assert_eq!(dat[start+4],sum,"track {} sector {}",track,sec);
        }
    }
}

#[test]
fn progress_is_reported() {
    let mut disk = Disk::format(geometry::FDD_8IN).expect("format failed");
    let mut last = 0;
    let mut count = 0;
    let mut observer = |pos: usize| {
        assert!(pos > last);
        last = pos;
        count += 1;
    };
    disk.write_file("P.DAT",&test_data(1000),Some(&mut observer)).expect("write failed");
    assert_eq!(count,8);
    assert_eq!(last,1000);
}
