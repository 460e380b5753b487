//! Transport tests against a live listener
