/// File format versions for durable slot files
///
/// A file-backed slot is framed with a magic number and a format version so
/// that foreign or future files are rejected instead of misread.
/// Slot file format version
pub const SLOT_FORMAT_VERSION: u16 = 1;

/// Magic numbers for file validation
pub mod magic {
    /// Slot magic: "CDKV" (CampusDb Key-Value)
    pub const SLOT: u32 = 0x43444B56;
}

/// Version compatibility information
pub struct FormatVersion {
    /// Current version of this format
    pub current: u16,
    /// Minimum supported version for reading
    pub min_read: u16,
}

impl FormatVersion {
    /// Check if a version can be read
    pub fn can_read(&self, version: u16) -> bool {
        version >= self.min_read && version <= self.current
    }
}

/// Slot format version info
pub fn slot_version() -> FormatVersion {
    FormatVersion {
        current: SLOT_FORMAT_VERSION,
        min_read: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_compatibility() {
        let v = slot_version();
        assert!(v.can_read(1));
        assert!(!v.can_read(0));
        assert!(!v.can_read(999));
    }
}
