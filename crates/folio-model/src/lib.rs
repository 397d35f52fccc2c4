pub mod entry;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod options;

pub use entry::{Entry, MetadataPatch, Resolution, display_name_for};
pub use error::{ModelError, Result};
pub use ids::EntryId;
pub use metadata::{ByteSize, DocumentInfo, PreviewImage};
pub use options::SortKey;
