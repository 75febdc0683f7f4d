// Review identity, quality scoring and best-review selection.
// Codec, scorer and selection are pure; all upstream I/O goes through `aggregate`.

pub mod aggregate;
pub mod handlers;
pub mod identity;
pub mod keywords;
pub mod scoring;
pub mod selection;
