pub mod map_service;
pub mod prompts;
pub mod reduce_service;
pub mod transcript_writer;

pub use map_service::MapService;
pub use reduce_service::ReduceService;
pub use transcript_writer::TranscriptWriter;
