//! Cross-crate test suite for the sequencing runtime.

#[cfg(test)]
mod cross_thread;

#[cfg(test)]
mod inspector_ndjson;

#[cfg(test)]
mod scheduling_e2e;
