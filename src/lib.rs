//! Resolve application updates from a remote, per-platform manifest.
//!
//! ```no_run
//! use platform_update::{UpdateManager, Version};
//!
//! # async fn check() -> platform_update::Result<()> {
//! let manager = UpdateManager::new("https://example.com/updates.json", "win32");
//! if let Some(update) = manager.get_latest_version(false).await? {
//!     if update.update_available(&Version::new(1, 0, 0, 0)) {
//!         println!("{} is available at {}", update.version_string(), update.update_url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod blocking;
pub mod error;
pub mod hash;
pub mod http;
pub mod manifest;
pub mod resolver;
pub mod version;

pub use error::{Result, UpdateError};
pub use http::{FetchManifest, HttpClient, ProxyConfig};
pub use manifest::{FileHash, ManifestFormat, PlatformUpdate, PlatformUpdates, Update};
pub use resolver::{UpdateManager, UpdateResolver};
pub use version::Version;
