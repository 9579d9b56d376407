//! An insertion-ordered map. Keys come back out of [`OrderedMap::range`] in
//! the order they were first stored; updating a key leaves it where it is,
//! and deleting then re-storing one sends it to the back.
//!
//! ```
//! use ordered_map::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.store("Name", "Bob".to_owned());
//! map.store("Job", "Builder".to_owned());
//!
//! assert_eq!("{\"Name\": \"Bob\", \"Job\": \"Builder\"}", map.to_string());
//! ```

mod error;
mod null_hasher;
mod order_list;
mod ordered_map;
mod render;
#[cfg(feature = "shared_map")]
mod shared_map;

pub use crate::error::Error;
pub use crate::ordered_map::OrderedMap;
#[cfg(feature = "shared_map")]
pub use crate::shared_map::SharedOrderedMap;

/// Version of this crate, for consumers tracking compatibility.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
