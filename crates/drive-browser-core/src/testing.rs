//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked gateway and transport.

use crate::storage::{FileEntry, MockStorageGateway};
use crate::transport::MockChatTransport;

/// `n` entries named `file1..=fileN` with ids `id1..=idN`.
#[must_use]
pub fn file_entries(n: usize) -> Vec<FileEntry> {
    (1..=n)
        .map(|i| FileEntry::new(format!("id{i}"), format!("file{i}")))
        .collect()
}

/// Create a mock gateway that lists `n` files.
///
/// `download_file` is left without expectations, so any call fails the test.
#[must_use]
pub fn mock_gateway_with_files(n: usize) -> MockStorageGateway {
    let mut mock = MockStorageGateway::new();
    mock.expect_list_files()
        .returning(move || Ok(file_entries(n)));
    mock
}

/// Create a mock transport that accepts every message and document.
#[must_use]
pub fn mock_transport_accepting() -> MockChatTransport {
    let mut mock = MockChatTransport::new();

    mock.expect_send_message().returning(|_, _, _| Ok(()));

    mock.expect_send_document().returning(|_, _| Ok(()));

    mock
}
