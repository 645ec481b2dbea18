//! Client for blockchain archive endpoints.
//!
//! Runs filtered queries over block, transaction, log and trace data with
//! cursor-based pagination, concurrent ordered streaming, and live height
//! watching. A signature-directed decoder turns raw log and call payloads
//! into typed values.

pub mod client;
pub mod config;
pub mod decode;
pub mod models;
pub mod preset_query;
pub mod transport;
pub mod utils;

pub use client::{Client, HeightEvent, HeightWatch, QueryStream};
pub use config::{ClientConfig, StreamConfig};
pub use decode::{
    AbiType, CallDecoder, DecodedEvent, DecodedSolValue, Decoder, EventDescriptor, EventFragment,
    FunctionDescriptor,
};
pub use models::data::{Block, Event, Log, Trace, Transaction, Withdrawal};
pub use models::errors::{DecodeError, ParseError, StreamError};
pub use models::query::{
    BlockField, BlockSelection, FieldSelection, JoinMode, LogField, LogSelection, Query, Sighash,
    TraceField, TraceSelection, TransactionField, TransactionSelection,
};
pub use models::response::{
    ArchiveHeight, Events, QueryResponse, QueryResponseData, RollbackGuard,
};
pub use transport::{HttpTransport, Transport};
