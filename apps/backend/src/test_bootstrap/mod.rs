//! Shared setup for unit tests.
