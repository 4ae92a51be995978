//! Device feed backed by a spreadsheet web app.

mod fetcher;
mod rows;

pub use fetcher::SheetFetcher;
pub use rows::{parse_payload, SheetPayload};
