/// All errors that can be returned by a StoryStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No version of the story has been saved.
    #[error("story not found: {story_id}")]
    StoryNotFound { story_id: String },

    /// The story exists but not at this version.
    #[error("story version not found: {story_id}@{version}")]
    VersionNotFound { story_id: String, version: u32 },

    /// Only drafts can be published.
    #[error("story version {story_id}@{version} is {status}, not a draft")]
    NotADraft {
        story_id: String,
        version: u32,
        status: crate::record::VersionStatus,
    },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
