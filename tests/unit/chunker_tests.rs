/*!
 * Tests for token-budgeted transcript chunking
 */

use tldw::transcript::{
    ChunkStats, ChunkingConfig, Transcript, TranscriptChunker, TranscriptOrigin, TranscriptSegment,
};

use crate::common::long_transcript;

fn chunker(max_tokens: usize, max_chars: usize) -> TranscriptChunker {
    TranscriptChunker::new(ChunkingConfig {
        max_tokens,
        max_chars,
    })
}

#[test]
fn test_chunk_withEmptyTranscript_shouldReturnNoChunks() {
    let transcript = Transcript::new("en", TranscriptOrigin::Manual, Vec::new());
    assert!(TranscriptChunker::default().chunk(&transcript).is_empty());
}

#[test]
fn test_chunk_withShortTranscript_shouldReturnSingleChunk() {
    let transcript = long_transcript(5, 10);
    let chunks = TranscriptChunker::default().chunk(&transcript);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, transcript.full_text());
    assert_eq!(chunks[0].segments.len(), 5);
    assert_eq!(chunks[0].language, "en");
}

#[test]
fn test_chunk_withLongTranscript_shouldRespectTokenBudget() {
    // 25 segments of ~50 estimated tokens each, against a 120-token budget
    let transcript = long_transcript(25, 30);
    let chunks = chunker(120, 100_000).chunk(&transcript);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // A chunk holds at most two of these segments under this budget
        assert!(chunk.segments.len() <= 2);
        assert!(chunk.token_count <= 120);
    }
}

#[test]
fn test_chunk_shouldReproduceInputSegmentSequence() {
    let transcript = long_transcript(40, 20);
    let chunks = chunker(100, 100_000).chunk(&transcript);
    assert!(chunks.len() > 1);

    let reassembled: Vec<TranscriptSegment> = chunks
        .iter()
        .flat_map(|c| c.segments.iter().cloned())
        .collect();
    assert_eq!(reassembled, transcript.segments);

    // Indexes are dense and ordered
    for (expected, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, expected);
    }
}

#[test]
fn test_chunk_shouldKeepChunksContiguousInTime() {
    let transcript = long_transcript(30, 25);
    let chunks = chunker(150, 100_000).chunk(&transcript);
    assert!(chunks.len() > 1);

    for pair in chunks.windows(2) {
        // Each chunk starts where the previous one ended
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
    assert_eq!(chunks[0].start_time, 0.0);
    assert_eq!(chunks.last().unwrap().end_time, transcript.duration_seconds());
}

#[test]
fn test_chunk_withOversizedSegment_shouldKeepItWhole() {
    // One segment alone blows the budget; it still lands in exactly one chunk
    let huge = (0..200)
        .map(|i| format!("w{}", i))
        .collect::<Vec<_>>()
        .join(" ");
    let transcript = Transcript::new(
        "en",
        TranscriptOrigin::Manual,
        vec![
            TranscriptSegment::new("a short opener", 0.0, 2.0),
            TranscriptSegment::new(huge, 2.0, 60.0),
            TranscriptSegment::new("a short closer", 62.0, 2.0),
        ],
    );

    let chunks = chunker(50, 100_000).chunk(&transcript);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].segments.len(), 1);
    assert!(chunks[1].token_count > 50);
}

#[test]
fn test_chunk_withTightCharBudget_shouldSplitOnChars() {
    // The token budget allows six segments per chunk; the char budget
    // caps it at two, so chars are the binding constraint
    let transcript = long_transcript(20, 10);
    let chunks = chunker(150, 200).chunk(&transcript);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.char_count <= 200 || chunk.segments.len() == 1);
    }
}

#[test]
fn test_chunk_withWhitespaceSegments_shouldNotChargeThemToBudget() {
    let transcript = Transcript::new(
        "en",
        TranscriptOrigin::Auto,
        vec![
            TranscriptSegment::new("first real segment here", 0.0, 2.0),
            TranscriptSegment::new("   ", 2.0, 1.0),
            TranscriptSegment::new("second real segment here", 3.0, 2.0),
        ],
    );

    let chunks = TranscriptChunker::default().chunk(&transcript);
    assert_eq!(chunks.len(), 1);
    // The blank segment rides along in the segment list
    assert_eq!(chunks[0].segments.len(), 3);
    assert_eq!(chunks[0].text, "first real segment here second real segment here");
}

#[test]
fn test_chunkStats_shouldAggregateAcrossChunks() {
    let transcript = long_transcript(25, 30);
    let chunks = chunker(120, 100_000).chunk(&transcript);
    let stats = ChunkStats::from_chunks(&chunks);

    assert_eq!(stats.total_chunks, chunks.len());
    assert_eq!(
        stats.total_tokens,
        chunks.iter().map(|c| c.token_count).sum::<usize>()
    );
    assert_eq!(stats.duration_seconds, transcript.duration_seconds());
    assert!(stats.avg_tokens_per_chunk <= 120 + 120);
}
