mod columns;
mod driver;
mod expand;
mod lookup;
mod progress;
mod report;
mod seed;
mod writer;

#[cfg(test)]
mod testing;

pub use driver::{IngestOptions, IngestionDriver};
pub use progress::ConsoleProgress;
pub use writer::WritePolicy;
