pub mod attributes;
pub mod media_type;

pub use attributes::{UriAttribute, tag_name};
pub use media_type::{PLAYLIST_CONTENT_TYPE, is_playlist};
