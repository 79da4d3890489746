//! Implementation modules for `storage::store`.
//!
//! `store.rs` is the stable facade; each module here owns one table family
//! and works on a borrowed `Connection`.

pub(crate) mod conn;
pub(crate) mod ranking;
pub(crate) mod rows;
pub(crate) mod stats;
pub(crate) mod trials;
pub(crate) mod txn;
pub(crate) mod users;
