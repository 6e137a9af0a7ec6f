use std::str::FromStr;

/// Status byte for a deleted file, also fill value for unused sectors.
pub const DELETED: u8 = 0xe5;
/// Largest possible user number plus one
pub const USER_END: u8 = 0x10;
/// Records counted by a single extent number
pub const RECORD_MAX: usize = 128;
/// CP/M end of file marker in text files
pub const EOF_MARK: u8 = 0x1a;
/// Bytes trimmed from the end of a file as it is read
pub const TRAILING_FILL: [u8;3] = [0x00,EOF_MARK,DELETED];
/// Maximum length of the file name, not counting the type
pub const NAME_LEN: usize = 8;
/// Maximum length of the file type
pub const TYPE_LEN: usize = 3;
/// Characters forbidden from file names
pub const INVALID_CHARS: &str = "<>,;:?*[]%|()/\\";

/// Enumerates CP/M errors.  The `Display` trait will print the long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file not found")]
    FileNotFound,
    #[error("file exists")]
    FileExists,
    #[error("no valid characters in file name")]
    InvalidName,
    #[error("disk full, {0} bytes were written")]
    NoSpace(usize),
    #[error("user {0} is out of range 0-15")]
    InvalidOwner(u8),
    #[error("directory structure is corrupt")]
    CorruptImage
}

/// How to treat file data as it is copied out of the image
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum TransferMode {
    /// binary unless every byte is 7-bit, in which case text
    Auto,
    Binary,
    /// stop at the first 0x1a in the last record
    Text
}

impl FromStr for TransferMode {
    type Err = std::fmt::Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "bin" => Ok(Self::Binary),
            "txt" => Ok(Self::Text),
            _ => Err(std::fmt::Error)
        }
    }
}

/// Summary of one file, as shown in the directory listing
#[derive(Clone,PartialEq,Eq,Debug)]
pub struct FileInfo {
    pub name: String,
    pub typ: String,
    /// size in bytes, to the nearest record
    pub bytes: usize,
    /// allocated space in kilobytes
    pub kb: usize,
    pub user: u8,
    /// `R` or `W` followed by `S` or space
    pub attributes: String
}
