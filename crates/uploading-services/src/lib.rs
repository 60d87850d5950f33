//! Uploading Services Library
//!
//! Business logic behind the plugin's two mutations: signed upload grants and
//! attaching remote media to products.

pub mod attachment;
pub mod classifier;
pub mod error;
pub mod mutations;
pub mod naming;
pub mod oembed;
pub mod presign;
pub mod remote;
pub mod url_guard;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use attachment::MediaAttachmentService;
pub use classifier::{MediaClass, MediaClassifier};
pub use error::{MutationError, ValidationCode};
pub use mutations::{
    CreatePreSignedUrl, Mutation, MutationRequest, MutationResponse, MutationSet,
    PresignRequest, ProductMediaCreateExtended, ProductMediaInput, ProductResolver,
};
pub use oembed::{HttpOembedResolver, OembedData, OembedResolver, ProviderRegistry};
pub use presign::PresignedUrlIssuer;
pub use remote::{FetchedMedia, HttpRemoteMedia, RemoteMedia};
pub use url_guard::UrlPolicy;
