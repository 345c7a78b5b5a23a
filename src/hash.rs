//! Content hashing used to short-circuit identical files

use crate::error::Result;
use blake3::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A hash value represented as a hex string
pub type HashValue = String;

/// Hash a file's contents
pub fn hash_file(path: &Path) -> Result<HashValue> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Whether two files have byte-identical contents
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}
