/// This module provides a delimited (CSV, TSV) item reader and writer implementation.
pub mod delimited;
