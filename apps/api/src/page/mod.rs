// Page-injected side of the pipeline: everything that reads or writes the
// marketplace page. Nothing in here performs I/O.

pub mod document;
pub mod extractor;
pub mod form_writer;
pub mod locator;
pub mod selectors;
