use crate::chd::models::ChdHeader;
use crate::chd::store::HunkStore;
use crate::chd::store::error::{StoreError, StoreResult};

/// In-memory [`HunkStore`], the test double for the native decode engine.
///
/// Holds decoded hunks and metadata records directly, so geometry and
/// emission logic can be exercised without a container file or codec in
/// sight. Hunks shorter than `hunk_bytes` read back zero-padded, mirroring
/// the zero fill a real store applies to the tail of the last hunk.
pub struct MemoryHunkStore {
    header: ChdHeader,
    metadata: Vec<([u8; 4], String)>,
    hunks: Vec<Vec<u8>>,
}

impl MemoryHunkStore {
    pub fn new(header: ChdHeader) -> Self {
        Self {
            header,
            metadata: Vec::new(),
            hunks: Vec::new(),
        }
    }

    /// Append a metadata record; enumeration order is insertion order,
    /// per tag.
    pub fn push_metadata(&mut self, tag: [u8; 4], record: impl Into<String>) {
        self.metadata.push((tag, record.into()));
    }

    pub fn push_hunk(&mut self, data: Vec<u8>) {
        self.hunks.push(data);
    }
}

impl HunkStore for MemoryHunkStore {
    fn header(&self) -> &ChdHeader {
        &self.header
    }

    fn metadata(&mut self, tag: [u8; 4], index: u32) -> StoreResult<Option<String>> {
        Ok(self
            .metadata
            .iter()
            .filter(|(t, _)| *t == tag)
            .nth(index as usize)
            .map(|(_, record)| record.clone()))
    }

    fn read_hunk(&mut self, hunk: u32, buf: &mut [u8]) -> StoreResult<()> {
        let data = self
            .hunks
            .get(hunk as usize)
            .ok_or(StoreError::HunkOutOfRange(hunk))?;
        debug_assert!(data.len() <= buf.len());
        buf.fill(0);
        buf[..data.len()].copy_from_slice(data);
        Ok(())
    }
}
