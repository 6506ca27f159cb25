//! Transaction helpers.

pub mod txn;
