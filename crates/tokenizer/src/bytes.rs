//! Byte-to-unicode visual mapping.
//!
//! Byte-level BPE operates on a "visual" alphabet: every one of the 256
//! byte values is assigned a printable code point so that piece strings
//! stay valid UTF-8. Printable ASCII and two Latin-1 ranges map to
//! themselves; the remaining bytes are assigned code points from 256
//! upward in ascending byte order.

use ahash::AHashMap;

/// Build the byte -> code point table.
pub fn byte_to_char_table() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut direct = [false; 256];

    for b in 0x21..=0x7eusize {
        // '!'..='~'
        table[b] = b as u8 as char;
        direct[b] = true;
    }
    for b in 0xa1..=0xacusize {
        // '¡'..='¬'
        table[b] = char::from_u32(b as u32).expect("latin-1 code point");
        direct[b] = true;
    }
    for b in 0xae..=0xffusize {
        // '®'..='ÿ'
        table[b] = char::from_u32(b as u32).expect("latin-1 code point");
        direct[b] = true;
    }

    let mut counter = 0u32;
    for b in 0..256usize {
        if !direct[b] {
            table[b] = char::from_u32(256 + counter).expect("code point below surrogates");
            counter += 1;
        }
    }
    table
}

/// Build the inverse code point -> byte table.
pub fn char_to_byte_table() -> AHashMap<char, u8> {
    let forward = byte_to_char_table();
    let mut inverse = AHashMap::with_capacity(256);
    for (byte, &ch) in forward.iter().enumerate() {
        inverse.insert(ch, byte as u8);
    }
    inverse
}
