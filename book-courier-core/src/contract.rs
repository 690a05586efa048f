//! # contract: collaborator interfaces of the publish-once scheduler
//!
//! The scheduler itself never talks to the network and never formats captions.
//! It drives two narrow collaborators:
//!
//! - [`Channel`]: sends one file plus caption to the external channel.
//! - [`CaptionGenerator`]: turns a book identity, publisher label and date into a caption.
//!
//! ## Mocking & Testing
//! - [`Channel`] is annotated for `mockall`, so tests get a `MockChannel`
//!   (enabled by the default `test-export-mocks` feature for downstream crates).
//! - Implementors report transport failures as a boxed error; the scheduler
//!   only cares whether the send succeeded.

use async_trait::async_trait;
use chrono::NaiveDate;

use mockall::automock;

use crate::identity::BookIdentity;

/// Boxed transport error returned by [`Channel`] implementors.
pub type ChannelError = Box<dyn std::error::Error + Send + Sync>;

/// Extensions sent through the image transport. Everything else is a document.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// How a file is delivered through the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    /// Selected purely by extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Self {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Image,
            _ => MediaKind::Document,
        }
    }
}

/// One outbound post: the file bytes and the caption to go with them.
#[derive(Debug, Clone)]
pub struct OutgoingPost {
    pub kind: MediaKind,
    /// Filename presented to the channel (the inbox filename).
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: String,
}

/// Trait for the external messaging channel.
///
/// Implementors are expected to carry their own request timeout.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Channel: Send + Sync {
    /// Send one post. `Ok` means the channel accepted it.
    async fn send(&self, post: OutgoingPost) -> Result<(), ChannelError>;
}

/// Produces the caption text for a book.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CaptionGenerator: Send + Sync {
    fn caption(&self, identity: &BookIdentity, publisher: &str, date: NaiveDate) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_by_extension() {
        assert_eq!(MediaKind::from_filename("cover.PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("a - b.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("anim.gif"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("book.pdf"), MediaKind::Document);
        assert_eq!(MediaKind::from_filename("README"), MediaKind::Document);
        assert_eq!(MediaKind::from_filename("photo.jpg.zip"), MediaKind::Document);
    }
}
