//! Integration tests for the satchel store and dispatcher

mod support;

mod concurrency;
mod find_latest;
mod scan_dispatch;
mod shell;
mod store_roundtrip;
