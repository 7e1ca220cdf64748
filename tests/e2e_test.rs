//! End-to-end tests: run the freshen binary in a temp directory.

mod e2e;
