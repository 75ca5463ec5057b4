use super::report::RowFailure;

/// Receives progress notifications from the ingestion loop.
pub trait ProgressObserver {
    fn on_progress(&mut self, rows: u64);

    fn on_milestone(&mut self, rows: u64);

    fn on_row_failed(&mut self, _failure: &RowFailure) {}
}

/// Prints progress to stdout.
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, rows: u64) {
        println!("{rows} rows processed");
    }

    fn on_milestone(&mut self, rows: u64) {
        println!("Milestone reached: {rows} rows processed");
    }
}
