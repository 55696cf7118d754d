//! Integration tests for diskmirror-yadisk
//!
//! Uses wiremock to simulate the Yandex Disk API and verifies the
//! behavior of every remote store operation end to end.

mod common;

mod test_folder;
mod test_listing;
mod test_transfer;
