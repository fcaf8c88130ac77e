//! Integration tests for the `glbind` derive macros live in `tests/`.
