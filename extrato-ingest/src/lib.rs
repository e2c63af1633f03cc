//! extrato-ingest: statement format detection and institution-specific line extractors.

pub mod cards;
pub mod category;
pub mod fields;
pub mod parsers;
pub mod pipeline;
pub mod reconstruct;
pub mod registry;
pub mod state;

pub use category::CategoryResolver;
pub use parsers::Institution;
pub use pipeline::{ManualEntry, StatementInput, StatementParser};
pub use registry::{Detection, FormatRegistry};
pub use state::Mode;
