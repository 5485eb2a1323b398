//! Core traits defined in `dbox-core` and implemented by other crates.

pub mod object_store;

pub use object_store::{
    ByteStream, ObjectMeta, ObjectStore, PutOutcome, collect_stream, limit_stream, stream_from_bytes,
};
