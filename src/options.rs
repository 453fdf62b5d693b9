/// Container member count at or below which [`crate::Builder`] emits compact containers.
pub const DEFAULT_COMPACT_THRESHOLD: usize = 4;

/// Knobs controlling how [`crate::Builder`] lays out containers.
///
/// The defaults produce indexed containers for anything larger than a handful of members and
/// keep object attributes in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Containers with at most this many members are written without an index table.
    pub compact_threshold: usize,
    /// Always write arrays in the compact form.
    pub build_unindexed_arrays: bool,
    /// Always write objects in the compact form.
    pub build_unindexed_objects: bool,
    /// Sort the index table of objects by key, enabling binary search in [`crate::Slice::get`].
    pub sort_attribute_names: bool,
    /// Reject objects that contain the same key twice.
    pub check_attribute_uniqueness: bool,
}

impl BuilderOptions {
    /// Options that always write index tables and sort object keys.
    #[must_use]
    pub const fn indexed_sorted() -> Self {
        Self {
            compact_threshold: 0,
            build_unindexed_arrays: false,
            build_unindexed_objects: false,
            sort_attribute_names: true,
            check_attribute_uniqueness: false,
        }
    }
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
            build_unindexed_arrays: false,
            build_unindexed_objects: false,
            sort_attribute_names: false,
            check_attribute_uniqueness: false,
        }
    }
}
