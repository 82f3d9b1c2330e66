// Cross-context messaging: the page-injected, background and UI contexts and
// the transport that connects them.

pub mod background;
pub mod page_context;
pub mod protocol;
pub mod tabs;
pub mod transport;
pub mod ui;

#[cfg(test)]
pub(crate) mod fixtures;
