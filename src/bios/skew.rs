//! ## Sector Skewing Module
//!
//! This contains all the sector skew tables.  A table maps a logical sector index within a track
//! to a physical sector.  Whether the entries are 0-based or 1-based depends on how the table is
//! consumed, see `geometry::SkewKind`.
//!
//! The sector skews are kept separate from the geometries because several geometries share a table.

/// Skew table for the MITS 8 inch floppy controller.  This is 1-based, and is passed through
/// an additional transformation for tracks 6 and up, see `MITS_RESKEW_TRACK`.
pub const MITS_8IN: [usize;32] = [
    1,9,17,25,3,11,19,27,5,13,21,29,7,15,23,31,
    2,10,18,26,4,12,20,28,6,14,22,30,8,16,24,32
];

/// Skew table for the MITS 5MB hard disk, 0-based.
/// Sectors are taken in pairs, which is why the table looks like it has an interleave of 1.
pub const MITS_HDD_5MB: [usize;96] = [
    0,1,14,15,28,29,42,43,8,9,22,23,
    36,37,2,3,16,17,30,31,44,45,10,11,
    24,25,38,39,4,5,18,19,32,33,46,47,
    12,13,26,27,40,41,6,7,20,21,34,35,
    48,49,62,63,76,77,90,91,56,57,70,71,
    84,85,50,51,64,65,78,79,92,93,58,59,
    72,73,86,87,52,53,66,67,80,81,94,95,
    60,61,74,75,88,89,54,55,68,69,82,83
];

/// Skew table for the Tarbell floppy controller, 0-based, interleave of 6
pub const TARBELL: [usize;26] = [
    0,6,12,18,24,4,10,16,22,2,8,14,20,1,7,13,19,25,5,11,17,23,3,9,15,21
];

/// The FDC+ 1.5MB format has no skew, 0-based
pub const FDC_1_5MB: [usize;80] = [
    0,1,2,3,4,5,6,7,8,9,
    10,11,12,13,14,15,16,17,18,19,
    20,21,22,23,24,25,26,27,28,29,
    30,31,32,33,34,35,36,37,38,39,
    40,41,42,43,44,45,46,47,48,49,
    50,51,52,53,54,55,56,57,58,59,
    60,61,62,63,64,65,66,67,68,69,
    70,71,72,73,74,75,76,77,78,79
];

/// SIMH 8 inch images have no literal skew, but go through the MITS controller re-skew.
/// This is 1-based.  Only the first 32 entries are reachable.
pub const SIMH_8IN: [usize;79] = [
    1,2,3,4,5,6,7,8,9,
    10,11,12,13,14,15,16,17,18,19,
    20,21,22,23,24,25,26,27,28,29,
    30,31,32,33,34,35,36,37,38,39,
    40,41,42,43,44,45,46,47,48,49,
    50,51,52,53,54,55,56,57,58,59,
    60,61,62,63,64,65,66,67,68,69,
    70,71,72,73,74,75,76,77,78,79
];

/// First track where the MITS controller applies its extra re-skew
pub const MITS_RESKEW_TRACK: usize = 6;

/// The MITS 8 inch controller takes the 1-based table entry through another skew
/// on tracks 6 and up.  This has to be reproduced exactly or the image is unreadable.
pub fn mits_reskew(track: usize,psec: usize) -> usize {
    if track < MITS_RESKEW_TRACK {
        return psec;
    }
    return ((psec - 1) * 17) % 32 + 1;
}

#[test]
fn reskew_is_permutation() {
    let mut seen = [false;32];
    for lsec in 0..32 {
        let psec = mits_reskew(MITS_RESKEW_TRACK,MITS_8IN[lsec]);
        assert!(psec>=1 && psec<=32);
        assert!(!seen[psec-1]);
        seen[psec-1] = true;
    }
    assert_eq!(mits_reskew(5,MITS_8IN[1]),9);
}
