#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(feature = "nightly", feature(allocator_api))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
mod test_utils;

#[macro_use]
mod error;

pub(crate) mod node;

mod link;
mod list;

pub mod registry;

#[cfg(feature = "counters")]
mod counters;

pub use error::ListError;
pub use link::{Iter, Link};
pub use list::List;
pub use registry::{ListHandle, Registry};

#[cfg(feature = "counters")]
pub use counters::Counters;
