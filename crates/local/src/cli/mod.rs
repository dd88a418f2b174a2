pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Archive, Endpoint, Info, Init, Quads, Query, Update, Version};
