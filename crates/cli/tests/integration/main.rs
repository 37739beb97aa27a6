mod audit_tests;
mod common;
mod fetch_tests;
mod filename_tests;
