pub mod record;
pub mod results;
pub mod stage;
pub mod wordcount;

pub use record::{MappingRecord, ShuffleResult, WordCount};
pub use stage::Stage;
