pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod path;
pub mod types;

pub use backend::Backend;
pub use config::{BackendConfig, BackendKind, LocalConfig, ObjectStoreConfig};
pub use error::{Error, Result};
pub use fs::FileSystem;
pub use types::{ByteStream, FileInfo, FileStream};
