//! Test fixtures for common test scenarios.
//!
//! Archive contents are deterministic but not valid zip files: nothing in
//! clipin looks inside an archive.

use crate::core::archive::{ArchiveFile, ArchiveSet};

/// A fake wheel of `size` bytes whose contents depend on its name.
pub fn wheel(name: &str, size: usize) -> ArchiveFile {
    let seed = name.bytes().fold(0u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b));
    let bytes: Vec<u8> = (0..size)
        .map(|i| seed.wrapping_add((i % 251) as u8))
        .collect();
    ArchiveFile::new(name, bytes)
}

/// The package of the worked examples, alone.
pub fn demo_wheel() -> ArchiveFile {
    wheel("demo-1.0-py3-none-any.whl", 10_240)
}

/// `demo==1.0` with its dependency closure.
pub fn demo_closure() -> ArchiveSet {
    ArchiveSet::from_files([
        demo_wheel(),
        wheel("dep_a-2.1-py3-none-any.whl", 5_120),
        wheel("dep_b-0.3-cp312-cp312-manylinux_2_17_x86_64.whl", 7_168),
    ])
    .expect("fixture names are unique")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_is_deterministic() {
        assert_eq!(wheel("a.whl", 64), wheel("a.whl", 64));
        assert_ne!(wheel("a.whl", 64).bytes(), wheel("b.whl", 64).bytes());
        assert_eq!(wheel("a.whl", 0).len(), 0);
    }

    #[test]
    fn test_demo_closure() {
        let set = demo_closure();
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().next().map(|f| f.name()), Some("demo-1.0-py3-none-any.whl"));
    }
}
