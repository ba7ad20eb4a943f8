pub mod error;
pub mod cookie;
pub mod mime;
pub mod fs;
pub mod layer;
