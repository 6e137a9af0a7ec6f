//! ## Altair disk images
//!
//! The image is a sequential dump of raw sectors.  Tracks are stored in order, and within a track the
//! sectors are stored in physical order, so the skew is applied when computing the offset.
//! The raw sector is the record plus whatever header and trailer the controller keeps.
//! For the MITS 8 inch controller this includes a checksum, which has to be updated whenever
//! a record is written.

use log::{trace,debug,warn,error};
use crate::bios::geometry::{Geometry,Checksum};
use crate::{STDRESULT,DYNERR};
use super::{Error,Location};

/// Fill value for a freshly formatted sector
const FORMAT_FILL: u8 = 0xe5;
/// Header bytes folded into the checksum on tracks 6 and up
const CSUM_HEADER_BYTES: [usize;4] = [2,3,5,6];
/// First track whose sectors carry the long header, with sector number and header checksum
const LONG_HEADER_TRACK: usize = 6;

fn data_sum(dat: &[u8]) -> u8 {
    dat.iter().fold(0,|acc: u8,x| acc.wrapping_add(*x))
}

/// Wrapper for the image buffer, together with the geometry that interprets it.
pub struct AltairImage {
    geometry: Geometry,
    data: Vec<u8>
}

impl AltairImage {
    /// Create a freshly formatted image
    pub fn create(geometry: Geometry) -> Result<Self,DYNERR> {
        let mut ans = Self {
            geometry,
            data: Vec::new()
        };
        ans.format()?;
        Ok(ans)
    }
    /// Wrap existing image data.  A length that does not match the geometry is accepted,
    /// any access that falls outside the buffer will produce `CorruptImage`.
    pub fn from_bytes(data: &[u8],geometry: Geometry) -> Self {
        if data.len()!=geometry.image_size {
            warn!("image length {} does not match {} ({})",data.len(),geometry.name,geometry.image_size);
        }
        Self {
            geometry,
            data: data.to_vec()
        }
    }
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
    /// byte offset of the start of a raw sector, `sector` is 1-based
    fn sector_offset(&self,track: usize,sector: usize) -> usize {
        track * self.geometry.track_len() + (sector - 1) * self.geometry.sector_len
    }
    fn check_range(&self,start: usize,len: usize) -> STDRESULT {
        if start + len > self.data.len() {
            error!("sector at {:#x} extends past end of image ({:#x})",start,self.data.len());
            return Err(Box::new(Error::CorruptImage));
        }
        Ok(())
    }
    /// Map an allocation block and record to a physical location.
    /// Only `record` modulo the records per allocation is used.
    pub fn locate(&self,alloc: usize,record: usize) -> Location {
        let geom = &self.geometry;
        let lrec = alloc * geom.recs_per_alloc() + record % geom.recs_per_alloc();
        let track = lrec / geom.sectors_per_track + geom.reserved_tracks;
        let lsec = lrec % geom.sectors_per_track;
        let sector = geom.skew(track,lsec);
        let offset = self.sector_offset(track,sector) + geom.offsets(track).data;
        trace!("allocation {}, record {}, logical {:#x}: track {}, sector {}, offset {:#x}",alloc,record,lsec,track,sector,offset);
        Location { track, sector, offset }
    }
    /// Read the data part of one record
    pub fn read_record(&self,alloc: usize,record: usize) -> Result<Vec<u8>,DYNERR> {
        let loc = self.locate(alloc,record);
        let len = self.geometry.data_sector_len;
        self.check_range(loc.offset,len)?;
        Ok(self.data[loc.offset..loc.offset+len].to_vec())
    }
    /// Write the data part of one record, short data is padded with 0x1a.
    /// The sector checksum is updated if the track calls for one.
    pub fn write_record(&mut self,alloc: usize,record: usize,dat: &[u8]) -> STDRESULT {
        let loc = self.locate(alloc,record);
        let len = self.geometry.data_sector_len;
        let sector_start = self.sector_offset(loc.track,loc.sector);
        self.check_range(sector_start,self.geometry.sector_len)?;
        let padded = super::quantize_block(dat,len,0x1a);
        self.data[loc.offset..loc.offset+len].copy_from_slice(&padded);
        let off = *self.geometry.offsets(loc.track);
        if off.csum_method!=Checksum::None {
            let mut csum = data_sum(&padded);
            if loc.track >= LONG_HEADER_TRACK {
                for i in CSUM_HEADER_BYTES {
                    csum = csum.wrapping_add(self.data[sector_start+i]);
                }
            }
            trace!("checksum {:02X} at {:#x}",csum,sector_start+off.csum);
            self.data[sector_start+off.csum] = csum;
        }
        Ok(())
    }
    /// Write a complete raw sector with no translation, `sector` is 1-based.
    /// Used only for formatting, the caller supplies any header, trailer, and checksum.
    pub fn write_raw_sector(&mut self,track: usize,sector: usize,dat: &[u8]) -> STDRESULT {
        let len = self.geometry.sector_len;
        if track >= self.geometry.num_tracks || sector < 1 || sector > self.geometry.sectors_per_track {
            error!("track/sector range should be 0-{}/1-{}",self.geometry.num_tracks-1,self.geometry.sectors_per_track);
            return Err(Box::new(Error::GeometryMismatch));
        }
        let start = self.sector_offset(track,sector);
        self.check_range(start,len)?;
        let padded = super::quantize_block(dat,len,FORMAT_FILL);
        self.data[start..start+len].copy_from_slice(&padded);
        Ok(())
    }
    /// Raw sector as laid down by the MITS 8 inch format routine.
    /// `idx` is the 0-based position of the sector on the track.
    fn mits_raw_sector(&self,track: usize,idx: usize) -> Vec<u8> {
        let geom = &self.geometry;
        let off = geom.offsets(track);
        let mut buf = vec![FORMAT_FILL;geom.sector_len];
        buf[off.track_nr] = ((track | 0x80) & 0xff) as u8;
        if track < LONG_HEADER_TRACK {
            buf[1] = 0x00;
            buf[2] = 0x01;
        } else {
            buf[2] = 0x01;
            buf[off.sect_nr] = ((idx * 17) % 32) as u8;
        }
        buf[off.stop] = 0xff;
        for i in off.zero..geom.sector_len {
            buf[i] = 0x00;
        }
        let mut csum = data_sum(&buf[off.data..off.data+geom.data_sector_len]);
        if track >= LONG_HEADER_TRACK {
            for i in CSUM_HEADER_BYTES {
                csum = csum.wrapping_add(buf[i]);
            }
        }
        buf[off.csum] = csum;
        buf
    }
    /// Format the whole image, discarding everything.  The buffer is resized to the geometry's length.
    pub fn format(&mut self) -> STDRESULT {
        let geom = self.geometry;
        debug!("formatting {} image",geom.name);
        self.data = vec![FORMAT_FILL;geom.image_size];
        if !geom.has_checksums() {
            // every byte 0xe5 is already a valid format
            return Ok(());
        }
        for track in 0..geom.num_tracks {
            for idx in 0..geom.sectors_per_track {
                let buf = self.mits_raw_sector(track,idx);
                self.write_raw_sector(track,idx+1,&buf)?;
            }
        }
        Ok(())
    }
}

#[test]
fn checksum_follows_data() {
    use crate::bios::geometry::FDD_8IN;
    let mut img = AltairImage::create(FDD_8IN).expect("format failed");
    // allocation 20 is on a track with the long header
    let loc = img.locate(20,3);
    assert!(loc.track >= LONG_HEADER_TRACK);
    img.write_record(20,3,&[1,2,3]).expect("write failed");
    let start = loc.offset - 7;
    let raw = img.to_bytes()[start..start+137].to_vec();
    let expected = data_sum(&raw[7..135]).wrapping_add(raw[2]).wrapping_add(raw[3]).wrapping_add(raw[5]).wrapping_add(raw[6]);
    assert_eq!(raw[4],expected);
    assert_eq!(raw[135],0xff);
    assert_eq!(img.read_record(20,3).expect("read failed")[0..4],[1,2,3,0x1a]);
}

#[test]
fn format_lays_down_raw_sectors() {
    use crate::bios::geometry::{FDD_8IN,TARBELL_FDD};
    let mut img = AltairImage::create(FDD_8IN).expect("format failed");
    // scribble over a sector, formatting again must restore it
    img.write_raw_sector(7,5,&[0;137]).expect("write failed");
    let scribbled = img.to_bytes();
    img.format().expect("format failed");
    let fresh = img.to_bytes();
    let start = 7 * 32 * 137 + 4 * 137;
    assert_ne!(scribbled[start..start+137],fresh[start..start+137]);
    assert_eq!(fresh[start],0x87);
    assert_eq!(fresh[start+1],((4 * 17) % 32) as u8);
    assert!(img.write_raw_sector(77,1,&[]).is_err());
    assert!(img.write_raw_sector(0,33,&[]).is_err());
    let plain = AltairImage::create(TARBELL_FDD).expect("format failed");
    assert!(plain.to_bytes().iter().all(|b| *b==FORMAT_FILL));
}
