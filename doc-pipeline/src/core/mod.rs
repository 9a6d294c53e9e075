pub mod chunking;
pub mod fs_scan;
pub mod normalize;
pub mod summary;
