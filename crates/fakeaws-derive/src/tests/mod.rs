//! Unit tests for attribute parsing and expansion
