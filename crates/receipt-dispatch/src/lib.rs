//! Receipt dispatch: scanned documents on a network share → employee folders
//! in the document service → signature flows.
//!
//! Identity matching and folder resolution live in the `routing` crate; this
//! crate wires them to the outside world (configuration, login, roster
//! workbook, share scanning, signing endpoint, archive).

pub mod archive;
pub mod auth;
pub mod config;
pub mod flow;
pub mod pipeline;
pub mod report;
pub mod roster_loader;
pub mod signing;
pub mod source;

pub use config::DispatchConfig;
pub use flow::FlowKind;
pub use pipeline::{run, run_with_roster, Pipeline};
pub use report::{FileOutcome, RunReport};
