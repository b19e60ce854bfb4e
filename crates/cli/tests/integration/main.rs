//! CLI integration tests driving the `casagen` binary end to end.

mod common;
mod edit_tests;
mod history_tests;
mod update_tests;
