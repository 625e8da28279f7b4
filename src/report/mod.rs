pub mod atomic;
pub mod csv;
pub mod document;
pub mod merger;
pub mod summary;
pub mod tally;
pub mod terminal;
