//! Object storage access
//!
//! The pipeline only needs two capabilities from a bucket: list keys under a
//! prefix one page at a time, and fetch one object's bytes. Both live behind
//! the [`ObjectStore`] trait so the pipeline can run against any backend.
//!
//! - [`HttpObjectStore`]: Object Storage REST API over `reqwest`
//!
//! ## Usage
//!
//! ```no_run
//! use report_sync::config::StoreConfig;
//! use report_sync::store::{HttpObjectStore, ObjectStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig {
//!         bucket: "ocid1.tenancy.oc1..example".to_string(),
//!         ..Default::default()
//!     };
//!     let store = HttpObjectStore::new(&config)?;
//!
//!     let page = store.list_objects(&config.prefix, None).await?;
//!     for object in &page.objects {
//!         println!("{}", object.name);
//!     }
//!     Ok(())
//! }
//! ```

mod http;
mod traits;

pub use http::HttpObjectStore;
pub use traits::ObjectStore;
