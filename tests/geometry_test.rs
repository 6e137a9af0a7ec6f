// test of disk geometries and sector translation
use std::collections::HashSet;
use altairdsk::bios::geometry::{self,Geometry,MAX_ALLOCS,MAX_DIRS};
use altairdsk::img;
use altairdsk::img::altair::AltairImage;

#[test]
fn ceilings_and_consistency() {
    for geom in geometry::ALL {
        assert!(geom.verify(),"{} failed verification",geom);
        assert!(geom.total_allocs() <= MAX_ALLOCS);
        assert!(geom.dir_entries <= MAX_DIRS);
        assert_eq!(geom.image_size,geom.num_tracks * geom.track_len());
    }
}

#[test]
fn derived_quantities() {
    let allocs: Vec<usize> = geometry::ALL.iter().map(|g| g.total_allocs()).collect();
    assert_eq!(allocs,vec![150,1215,1215,243,370,2046,496]);
    let rpe: Vec<usize> = geometry::ALL.iter().map(|g| g.recs_per_extent()).collect();
    assert_eq!(rpe,vec![128,256,256,128,256,256,128]);
    assert_eq!(geometry::FDD_8IN.ptr_size(),1);
    assert_eq!(geometry::TARBELL_FDD.alloc_slots(),16);
    assert_eq!(geometry::HDD_5MB.ptr_size(),2);
    assert_eq!(geometry::HDD_5MB.alloc_slots(),8);
    assert!(geometry::FDD_8IN.has_checksums());
    assert!(!geometry::SIMH_FDD_8IN.has_checksums());
}

#[test]
fn detect_by_length() {
    assert_eq!(Geometry::detect(337568).expect("not detected"),geometry::FDD_8IN);
    assert_eq!(Geometry::detect(256256).expect("not detected"),geometry::TARBELL_FDD);
    assert_eq!(Geometry::detect(0x10fdc0).expect("not detected"),geometry::SIMH_FDD_8IN);
    // two formats share this length, the first listed wins
    assert_eq!(Geometry::detect(4988928).expect("not detected"),geometry::HDD_5MB);
    match Geometry::detect(1000) {
        Err(img::Error::UnknownFormat) => {},
        _ => panic!("length 1000 should not be detected")
    }
}

#[test]
fn select_by_name() {
    assert_eq!(Geometry::from_name("fdd_1.5mb").expect("not found"),geometry::FDD_1_5MB);
    assert_eq!(Geometry::from_name("HDD_5MB_1024").expect("not found").dir_entries,1024);
    assert!(Geometry::from_name("FDD_9IN").is_err());
    assert_eq!(geometry::names().len(),7);
}

#[test]
fn translation_is_injective() {
    for geom in geometry::ALL {
        let img = AltairImage::create(geom).expect("format failed");
        let mut seen = HashSet::new();
        for alloc in 0..geom.total_allocs() {
            for rec in 0..geom.recs_per_alloc() {
                let loc = img.locate(alloc,rec);
                assert!(loc.sector >= 1 && loc.sector <= geom.sectors_per_track,"{}: bad sector {}",geom,loc);
                assert!(loc.track >= geom.reserved_tracks && loc.track < geom.num_tracks,"{}: bad track {}",geom,loc);
                assert!(loc.offset + geom.data_sector_len <= geom.image_size);
                assert!(seen.insert(loc.offset),"{}: {} is used twice",geom,loc);
            }
        }
    }
}

#[test]
fn mits_format_layout() {
    let img = AltairImage::create(geometry::FDD_8IN).expect("format failed");
    let dat = img.to_bytes();
    assert_eq!(dat.len(),337568);
    // track 0, sector 1
    assert_eq!(dat[0],0x80);
    assert_eq!(dat[131],0xff);
    assert_eq!(dat[132],(0xe5u32 * 128 % 256) as u8);
    // track 6, raw sector 2
    let start = 6 * 32 * 137 + 137;
    assert_eq!(dat[start],0x86);
    assert_eq!(dat[start+1],17);
    assert_eq!(dat[start+135],0xff);
    assert_eq!(dat[start+136],0x00);
    let csum = (0xe5u32 * 128 + 0x01 + 0xe5 + 0xe5 + 0xe5) % 256;
    assert_eq!(dat[start+4],csum as u8);
}

#[test]
fn json_dump() {
    let s = geometry::TARBELL_FDD.to_json(Some(2));
    assert!(s.contains("\"sectors_per_track\": 26"));
    assert!(s.contains("\"max\": 2048"));
}
