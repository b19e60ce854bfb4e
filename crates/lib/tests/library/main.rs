mod common;
mod history_tests;
mod update_tests;
