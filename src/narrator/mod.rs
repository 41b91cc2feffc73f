pub mod refiner;
pub mod speech;

pub use refiner::{NarrativeRefiner, OpenAiRefiner};
pub use speech::{GoogleTts, SpeechSynthesizer};
