use crate::chd::models::ChdHeader;

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::ChdFileStore;
pub use memory::MemoryHunkStore;

/// Capability surface over a hunk decode engine.
///
/// Mirrors the native reader API (`open`/`header`/`metadata`/`read_hunk`/
/// `close`): opening happens in the implementation's constructor and closing
/// on drop. Geometry and emission code only ever see this trait, so they can
/// be exercised against [`MemoryHunkStore`] without a container on disk.
///
/// A store is owned by exactly one reader and is not safe for concurrent
/// use; all access goes through `&mut self`.
pub trait HunkStore: Send {
    /// Header fields of the opened container.
    fn header(&self) -> &ChdHeader;

    /// Fetch the `index`-th metadata record carrying `tag`, or `None` once
    /// the tag's records are exhausted.
    fn metadata(&mut self, tag: [u8; 4], index: u32) -> StoreResult<Option<String>>;

    /// Decode one hunk into `buf`, which must be exactly `hunk_bytes` long.
    fn read_hunk(&mut self, hunk: u32, buf: &mut [u8]) -> StoreResult<()>;
}
