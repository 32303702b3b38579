use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wordfreq_chunker::{ChunkProducer, ChunkerConfig, ChunkerError, FileSet};
use wordfreq_dispatcher::{
    local_world, run_local, DispatchConfig, DispatchError, Dispatcher, ProtocolError,
    DISPATCHER_RANK,
};
use wordfreq_lexicon::LexicalCounter;

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn prose(bytes: usize) -> String {
    let sentence = "A llama e o gato comeram a maçã. Don't stop the rock’n’roll; mississippi!\n";
    let mut text = String::new();
    while text.len() + sentence.len() <= bytes {
        text.push_str(sentence);
    }
    while text.len() < bytes {
        text.push('x');
    }
    text
}

#[tokio::test]
async fn small_and_large_file_match_single_pass_counts() {
    let dir = TempDir::new().unwrap();
    let small = "oi!";
    let large = prose(9000);
    assert_eq!(small.len(), 3);
    assert_eq!(large.len(), 9000);
    let paths = [
        write(&dir, "small.txt", small.as_bytes()),
        write(&dir, "large.txt", large.as_bytes()),
    ];

    let (files, skipped) = FileSet::probe(&paths);
    let config = DispatchConfig::default()
        .with_processes(4)
        .with_chunk_size(4096);
    let report = run_local(files, skipped, &config).await.unwrap();

    let counter = LexicalCounter::new();
    for (file, text) in report.files.iter().zip([small, large.as_str()]) {
        let expected = counter.count(text.as_bytes());
        assert_eq!(file.word_count, expected.words, "{}", file.path.display());
        assert_eq!(file.consonant_word_count, expected.consonant_words);
    }
    assert_eq!(report.files[0].word_count, 1);
    assert_eq!(report.stats.workers, 3);
    assert!(report.stats.chunks_dispatched >= 4);
    assert_eq!(report.stats.bytes_dispatched, 9003);
}

#[tokio::test]
async fn each_slot_gets_one_chunk_per_round() {
    let dir = TempDir::new().unwrap();
    // Seven 8-byte words, each ending in a separator: seven chunks of 8 bytes.
    let path = write(&dir, "seven.txt", "aaaaaaa ".repeat(7).as_bytes());

    let (files, skipped) = FileSet::probe([&path]);
    let config = DispatchConfig::default().with_processes(4).with_chunk_size(8);
    let report = run_local(files, skipped, &config).await.unwrap();

    assert_eq!(report.stats.chunks_dispatched, 7);
    assert_eq!(report.stats.chunks_per_slot, vec![3, 2, 2]);
    // Two full rounds, one partial round, one retire-only round.
    assert_eq!(report.stats.rounds, 4);
    assert_eq!(report.files[0].word_count, 7);
}

#[tokio::test]
async fn surplus_workers_retire_in_the_first_round() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "two.txt", b"bbbbbbb cccc");

    let (files, skipped) = FileSet::probe([&path]);
    let config = DispatchConfig::default().with_processes(6).with_chunk_size(8);
    let report = run_local(files, skipped, &config).await.unwrap();

    assert_eq!(report.stats.chunks_per_slot, vec![1, 1, 0, 0, 0]);
    assert_eq!(report.stats.rounds, 2);
    assert_eq!(report.files[0].word_count, 2);
    assert_eq!(report.files[0].consonant_word_count, 2);
}

#[tokio::test]
async fn skipped_and_empty_files() {
    let dir = TempDir::new().unwrap();
    let empty = write(&dir, "empty.txt", b"");
    let text = write(&dir, "text.txt", "llama llama\n".as_bytes());
    let missing = dir.path().join("missing.txt");

    let (files, skipped) = FileSet::probe([&empty, &missing, &text]);
    let report = run_local(files, skipped, &DispatchConfig::default().with_processes(3))
        .await
        .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, missing);

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].path, empty);
    assert_eq!(report.files[0].word_count, 0);
    assert_eq!(report.files[0].consonant_word_count, 0);
    assert_eq!(report.files[1].path, text);
    assert_eq!(report.files[1].word_count, 2);
    assert_eq!(report.files[1].consonant_word_count, 2);
}

#[tokio::test]
async fn no_readable_files_is_a_setup_error() {
    let dir = TempDir::new().unwrap();
    let (files, skipped) = FileSet::probe([dir.path().join("nope.txt")]);

    let err = run_local(files, skipped, &DispatchConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Chunker(ChunkerError::NoInputFiles)));
}

#[tokio::test]
async fn single_process_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "a.txt", b"a");
    let (files, skipped) = FileSet::probe([&path]);

    let err = run_local(files, skipped, &DispatchConfig::default().with_processes(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidConfig(_)));
}

#[tokio::test]
async fn oversized_word_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "long.txt", b"antidisestablishmentarianism and more");
    let (files, skipped) = FileSet::probe([&path]);

    let err = run_local(files, skipped, &DispatchConfig::default().with_chunk_size(10))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Chunker(ChunkerError::UnsplittableWord { .. })
    ));
}

fn producer(dir: &TempDir) -> ChunkProducer {
    let path = write(dir, "input.txt", b"one two three ");
    let (files, _) = FileSet::probe([&path]);
    ChunkProducer::new(files, ChunkerConfig::default()).unwrap()
}

#[tokio::test]
async fn silent_worker_trips_the_reply_deadline() {
    let dir = TempDir::new().unwrap();
    let (endpoint, workers) = local_world(2, 16);
    let dispatcher = Dispatcher::new(endpoint, producer(&dir), Duration::from_millis(50)).unwrap();

    let err = dispatcher.run().await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Protocol(ProtocolError::Unresponsive {
            rank: 1,
            file_index: 0,
            timeout_ms: 50
        })
    ));
    drop(workers);
}

#[tokio::test]
async fn worker_hanging_up_mid_request_is_reported() {
    let dir = TempDir::new().unwrap();
    let (endpoint, mut workers) = local_world(2, 16);
    let mut worker = workers.remove(0);

    // Takes the whole assignment, then exits without replying.
    let fake = tokio::spawn(async move {
        for _ in 0..5 {
            worker.recv_frame_from(DISPATCHER_RANK).await.unwrap();
        }
    });

    let dispatcher = Dispatcher::new(endpoint, producer(&dir), Duration::from_secs(10)).unwrap();
    let err = dispatcher.run().await.unwrap_err();
    fake.await.unwrap();

    assert!(matches!(
        err,
        DispatchError::Protocol(ProtocolError::Disconnected {
            rank: 1,
            file_index: 0
        })
    ));
}

#[tokio::test]
async fn dispatcher_needs_a_worker() {
    let dir = TempDir::new().unwrap();
    let (endpoint, _) = local_world(1, 16);

    let err = Dispatcher::new(endpoint, producer(&dir), Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, DispatchError::Protocol(ProtocolError::NoWorkers)));
}
