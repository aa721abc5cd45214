#[cfg(feature = "markdown")]
mod filter;
