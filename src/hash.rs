//! File digests for verifying downloaded updates against a manifest.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, UpdateError};
use crate::manifest::FileHash;

/// Digest algorithms a manifest `HashType` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha1 => write!(f, "sha1"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
            HashAlgorithm::Sha384 => write!(f, "sha384"),
            HashAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = UpdateError;

    /// Accepts labels like `md5`, `SHA-1` or `Sha_256`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UpdateError::UnsupportedHashType(s.to_string())),
        }
    }
}

/// Digest of the file at `path` as lowercase hex.
pub fn calculate_file_hash(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    match algorithm {
        HashAlgorithm::Md5 => digest_reader::<Md5>(&mut reader),
        HashAlgorithm::Sha1 => digest_reader::<Sha1>(&mut reader),
        HashAlgorithm::Sha256 => digest_reader::<Sha256>(&mut reader),
        HashAlgorithm::Sha384 => digest_reader::<Sha384>(&mut reader),
        HashAlgorithm::Sha512 => digest_reader::<Sha512>(&mut reader),
    }
}

fn digest_reader<D: Digest + Write>(reader: &mut impl Read) -> Result<String> {
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

impl FileHash {
    /// Algorithm named by `hash_type`.
    pub fn algorithm(&self) -> Result<HashAlgorithm> {
        self.hash_type.parse()
    }

    /// Whether the file at `path` matches this hash (hex compared case-insensitively).
    pub fn verify_file(&self, path: &Path) -> Result<bool> {
        let actual = calculate_file_hash(path, self.algorithm()?)?;
        Ok(actual.eq_ignore_ascii_case(self.hash.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_MD5: &str = "098f6bcd4621d373cade4e832627b4f6";
    const TEST_SHA1: &str = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";
    const TEST_SHA256: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
    const TEST_SHA384: &str = "768412320f7b0aa5812fce428dc4706b3cae50e02a64caa16a782249bfe8efc4b7ef1ccb126255d196047dfedf17a0a9";
    const TEST_SHA512: &str = "ee26b0dd4af7e749aa1a8ee3c10ae9923f618980772e473f8819a5d4940e0db27ac185f8a0e1d5f84f88bc887fd67b143732c304cc5fa9ad8e6f57f50028a8ff";

    fn file_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!(
            "SHA-1".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha1
        );
        assert_eq!(
            "sha256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            "SHA-384".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha384
        );
        assert_eq!(
            "Sha_512".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha512
        );
    }

    #[test]
    fn test_algorithm_parse_unsupported() {
        let err = "crc32".parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, UpdateError::UnsupportedHashType(ref t) if t == "crc32"));
    }

    #[test]
    fn test_algorithm_display_round_trips() {
        for algorithm in [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            assert_eq!(
                algorithm.to_string().parse::<HashAlgorithm>().unwrap(),
                algorithm
            );
        }
    }

    #[test]
    fn test_calculate_file_hash() {
        let file = file_with(b"test");
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Md5).unwrap(),
            TEST_MD5
        );
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Sha1).unwrap(),
            TEST_SHA1
        );
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Sha256).unwrap(),
            TEST_SHA256
        );
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Sha384).unwrap(),
            TEST_SHA384
        );
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Sha512).unwrap(),
            TEST_SHA512
        );
    }

    #[test]
    fn test_calculate_file_hash_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = calculate_file_hash(&dir.path().join("missing.bin"), HashAlgorithm::Sha256)
            .unwrap_err();
        assert!(matches!(err, UpdateError::Io(_)));
    }

    #[test]
    fn test_verify_file() {
        let file = file_with(b"test");

        let hash = FileHash::new("sha256", TEST_SHA256.to_uppercase());
        assert!(hash.verify_file(file.path()).unwrap());

        let wrong = FileHash::new("sha256", TEST_SHA512);
        assert!(!wrong.verify_file(file.path()).unwrap());
    }

    #[test]
    fn test_verify_file_legacy_digests() {
        let file = file_with(b"test");
        assert!(FileHash::new("md5", TEST_MD5).verify_file(file.path()).unwrap());
        assert!(FileHash::new("SHA1", TEST_SHA1).verify_file(file.path()).unwrap());
        assert!(!FileHash::new("sha1", TEST_MD5).verify_file(file.path()).unwrap());
    }

    #[test]
    fn test_calculate_file_hash_large_file() {
        // spans several read buffers
        let content = vec![b'a'; 100_000];
        let file = file_with(&content);
        assert_eq!(
            calculate_file_hash(file.path(), HashAlgorithm::Sha256).unwrap(),
            hex::encode(Sha256::digest(&content))
        );
    }

    #[test]
    fn test_verify_file_unsupported_type() {
        let file = file_with(b"test");
        let hash = FileHash::new("crc32", "d87f7e0c");
        assert!(matches!(
            hash.verify_file(file.path()),
            Err(UpdateError::UnsupportedHashType(_))
        ));
    }
}
