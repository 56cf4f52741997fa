//! Source composition for [`VfsConfig`](super::VfsConfig).

pub mod merge_policy;
pub mod service;
