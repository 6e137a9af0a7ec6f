//! ### CP/M Packing Module
//!
//! Functions to pack and unpack 8.3 filenames, and to compare names with wildcards.

use log::info;
use super::types::*;

/// Turn any string into a valid CP/M filename, this never fails.
/// Forbidden and non-printing characters are dropped, only the first dot is kept,
/// and the name and type are truncated to 8 and 3 characters.  If the name runs past 8
/// characters before a dot appears, everything up to the next dot is skipped.
pub fn sanitize(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut ans = String::new();
    let mut found_dot = false;
    let mut name_count = 0;
    let mut ext_count = 0;
    let mut i = 0;
    while i < chars.len() && ans.len() < NAME_LEN + TYPE_LEN + 1 {
        let c = chars[i];
        i += 1;
        if !c.is_ascii_graphic() || INVALID_CHARS.contains(c) {
            continue;
        }
        if c=='.' {
            if !found_dot {
                found_dot = true;
                ans.push('.');
            }
            continue;
        }
        if found_dot {
            if ext_count==TYPE_LEN {
                break;
            }
            ext_count += 1;
            ans.push(c.to_ascii_uppercase());
        } else if name_count==NAME_LEN {
            found_dot = true;
            ans.push('.');
            // the character just consumed is part of the overlong name
            i -= 1;
            while i < chars.len() && chars[i]!='.' {
                i += 1;
            }
            while i < chars.len() && chars[i]=='.' {
                i += 1;
            }
        } else {
            name_count += 1;
            ans.push(c.to_ascii_uppercase());
        }
    }
    if ans.ends_with('.') {
        ans.pop();
    }
    if ans!=input {
        info!("converting name {} to {}",input,ans);
    }
    ans
}

/// Split a valid filename into space padded name and type fields, upper case
pub fn split_name(name: &str) -> ([u8;8],[u8;3]) {
    let upper = name.to_ascii_uppercase();
    let (base,ext) = match upper.split_once('.') {
        Some((b,e)) => (b.as_bytes().to_vec(),e.as_bytes().to_vec()),
        None => (upper.as_bytes().to_vec(),Vec::new())
    };
    let mut name_field = [0x20;8];
    let mut typ_field = [0x20;3];
    for i in 0..base.len().min(NAME_LEN) {
        name_field[i] = base[i];
    }
    for i in 0..ext.len().min(TYPE_LEN) {
        typ_field[i] = ext[i];
    }
    (name_field,typ_field)
}

/// Case insensitive comparison of `patt`, which may contain `*` and `?`, with the literal `name`.
/// `?` matches any one character, a dot included.  A trailing bare dot on either side is ignored, so `ABC.` equals `ABC`.
pub fn filename_equals(patt: &str,name: &str) -> bool {
    let p: Vec<char> = patt.to_ascii_uppercase().chars().collect();
    let s: Vec<char> = name.to_ascii_uppercase().chars().collect();
    let mut i1 = 0;
    let mut i2 = 0;
    let mut found_dot = false;
    while i1 < p.len() && i2 < s.len() {
        match p[i1] {
            '*' => {
                if found_dot {
                    return true;
                }
                match p[i1..].iter().position(|c| *c=='.') {
                    Some(k) => i1 += k,
                    None => return true
                }
                i2 = match s[i2..].iter().position(|c| *c=='.') {
                    Some(k) => i2 + k,
                    None => s.len()
                };
            },
            '?' => {
                i1 += 1;
                i2 += 1;
            },
            c => {
                if c!=s[i2] {
                    return false;
                }
                if c=='.' {
                    found_dot = true;
                }
                i1 += 1;
                i2 += 1;
            }
        }
    }
    let r1 = &p[i1..];
    let r2 = &s[i2..];
    if r1.is_empty() {
        return r2.is_empty() || r2==['.'];
    }
    // pattern tail such as `.` or `.*` against a name with no type
    r2.is_empty() && r1[0]=='.' && r1[1..].iter().all(|c| *c=='*')
}

#[test]
fn wildcards() {
    assert!(filename_equals("A*","ABC.TXT"));
    assert!(filename_equals("A?C.TXT","ABC.TXT"));
    assert!(filename_equals("*.COM","ASM.COM"));
    assert!(filename_equals("*.com","asm.com"));
    assert!(filename_equals("ABC.","ABC"));
    assert!(filename_equals("ABC","ABC."));
    assert!(filename_equals("*.*","ABC"));
    assert!(filename_equals("*.*","ABC.TXT"));
    assert!(!filename_equals("X*","ABC.TXT"));
    assert!(!filename_equals("A*.COM","ABC.TXT"));
    assert!(!filename_equals("AB","ABC"));
    assert!(!filename_equals("ABC.T","ABC.TXT"));
    assert!(filename_equals("AB?TXT","AB.TXT"));
    assert!(filename_equals("???.COM","ASM.COM"));
}

#[test]
fn sanitizing() {
    assert_eq!(sanitize("m80......com"),"M80.COM");
    assert_eq!(sanitize("toolongname.ext"),"TOOLONGN.EXT");
    assert_eq!(sanitize("name.extension"),"NAME.EXT");
    assert_eq!(sanitize("a<b>c*.t?x"),"ABC.TX");
    assert_eq!(sanitize("abcdefghijk"),"ABCDEFGH");
    assert_eq!(sanitize("stat.com"),"STAT.COM");
}

#[test]
fn splitting() {
    assert_eq!(split_name("asm.c"),(*b"ASM     ",*b"C  "));
    assert_eq!(split_name("NOTYPE"),(*b"NOTYPE  ",*b"   "));
}
