//! Community storage - one row per community, keyed by community id.

use crate::define_simple_storage;

define_simple_storage! {
    /// Community storage with byte-level API.
    pub struct CommunityStorage { table: "communities" }
}
