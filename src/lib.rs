pub mod annotator;
pub mod characters;
pub mod dialog_table;
pub mod discovery;
pub mod fanfic;
pub mod incremental;
pub mod network;
pub mod parallel_processing;
pub mod screenplay;

// Re-export main types for convenient access
pub use screenplay::{
    DialogSegmenter, NormalizerConfig, SceneGrammar, SceneSegmenter, ScreenplayParser,
    SegmenterConfig, Utterance,
};
pub use characters::{CharacterBins, NameResolution};
pub use network::{
    scene_network, story_network, window_network, CooccurrenceAccumulator, CooccurrenceEdge,
    Network, DEFAULT_WINDOW_SIZE, NO_CHARACTER,
};
pub use dialog_table::{DialogRow, TableMetadata};

// Re-export batch processing types and functions for benchmarking
pub use incremental::{generate_output_path, output_exists, should_process, OutputKind};
pub use parallel_processing::{
    process_files_parallel, BatchConfig, FileStats, ProcessingContext, RunStats, Task, WorkItem,
};
