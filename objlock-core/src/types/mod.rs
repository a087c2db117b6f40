mod lock;
mod primitives;

pub use lock::Lock;
pub use primitives::{ObjectId, Version};
