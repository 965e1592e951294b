//! Crate-level behaviour tests driven against the reference server.
