mod dto;
mod errors;

pub use dto::{PayloadBranch, PayloadCharacter, PayloadNode, PersistencePayload, SavedStory};
pub use errors::ApiError;
