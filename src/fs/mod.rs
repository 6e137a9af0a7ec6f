//! # File System Module
//!
//! File system modules handle interactions with directories and files.  The Altair disks only
//! ever carry the CP/M file system, which lives in the `cpm` sub-module.
//!
//! The file system sees the disk as a sequence of allocation blocks made of 128 byte records.
//! Transformation of an (allocation, record) pair to a physical disk address is handled within the
//! `img` module, and the sector skews it relies on are kept in the `bios` module.

pub mod cpm;
