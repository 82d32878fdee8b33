// src/progress.rs
/// Progress reporting for a fetch batch.
/// Front ends implement this to surface per-URL status to users.
pub trait Progress {
    /// Called at the start with the number of URLs in the batch.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A URL produced a price. `index` is its position in the input.
    fn item_done(&mut self, _index: usize, _url: &str) {}

    /// A URL ended without a price (fetch failure or no marker).
    fn item_failed(&mut self, _index: usize, _url: &str, _reason: &str) {}

    /// Called at the end of the batch.
    fn finish(&mut self) {}
}
