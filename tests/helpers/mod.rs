#![allow(dead_code)]

mod fakes;

pub use fakes::{
    FakeAdapter, FakeBehavior, FlakyFileRepository, FlakyMediaStore, GuardedQuotaStore,
    RecordingNotifier, StorageFaults, sample_result,
};
pub use harness::{TEST_BALANCE, TEST_RATE, TEST_USER, TestHarness, byte_stream, whisper_channel};
pub use mock_whisper::{MockWhisperServer, VERBOSE_RESPONSE};
pub use test_postgres::TestPostgres;
