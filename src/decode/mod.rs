pub mod signature;
pub mod value;

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::B256;
use anyhow::{Context, Result};
use tracing::debug;

use crate::models::data::{Event, Log, Transaction};
use crate::models::errors::{DecodeError, ParseError};
use crate::utils::decode_prefix_hex;

pub use signature::{EventDescriptor, EventFragment, FunctionDescriptor, Param};
pub use value::{AbiType, DecodedSolValue};

use value::{decode_head, decode_tuple, WORD};

/// Decoded form of a single log, split by where each parameter was encoded.
///
/// `indexed` holds the topic-encoded parameters and `body` the data-encoded
/// ones, each in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub indexed: Vec<DecodedSolValue>,
    pub body: Vec<DecodedSolValue>,
}

/// Signature-directed log decoder.
///
/// Holds a set of event signatures keyed by topic0. A log is matched on its
/// first topic; when several registered signatures share a topic0 they are
/// tried in registration order and the first successful decode wins.
#[derive(Debug, Clone)]
pub struct Decoder {
    events: Arc<HashMap<B256, Vec<EventDescriptor>>>,
    checksummed_addresses: bool,
}

impl Decoder {
    /// Build a decoder from human-readable event signatures, e.g.
    /// `"Transfer(address indexed from, address indexed to, uint256 amount)"`.
    pub fn from_signatures<S: AsRef<str>>(signatures: &[S]) -> Result<Self, ParseError> {
        let descriptors = signatures
            .iter()
            .map(|s| EventDescriptor::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_descriptors(descriptors))
    }

    /// Build a decoder from structured (JSON-ABI shaped) event fragments.
    pub fn from_fragments(fragments: &[EventFragment]) -> Result<Self, ParseError> {
        let descriptors = fragments
            .iter()
            .map(|f| f.resolve())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_descriptors(descriptors))
    }

    fn from_descriptors(descriptors: Vec<EventDescriptor>) -> Self {
        let mut events: HashMap<B256, Vec<EventDescriptor>> = HashMap::new();
        for descriptor in descriptors {
            events.entry(descriptor.topic0).or_default().push(descriptor);
        }
        Self {
            events: Arc::new(events),
            checksummed_addresses: false,
        }
    }

    /// Render decoded addresses as EIP-55 checksummed strings instead of
    /// raw address values.
    pub fn enable_checksummed_addresses(&mut self) {
        self.checksummed_addresses = true;
    }

    pub fn disable_checksummed_addresses(&mut self) {
        self.checksummed_addresses = false;
    }

    /// Decode a single log. Returns `None` when no registered signature
    /// matches the log or the payload does not fit any candidate.
    pub fn decode_log_sync(&self, log: &Log) -> Option<DecodedEvent> {
        match self.decode_log_impl(log) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("Failed to decode log: {}", e);
                None
            }
        }
    }

    /// Decode a batch of logs. The output is index-aligned with the input;
    /// a log that fails to decode leaves a `None` at its position instead of
    /// failing the batch.
    pub fn decode_logs_sync(&self, logs: &[Log]) -> Vec<Option<DecodedEvent>> {
        logs.iter().map(|log| self.decode_log_sync(log)).collect()
    }

    pub fn decode_events_sync(&self, events: &[Event]) -> Vec<Option<DecodedEvent>> {
        events
            .iter()
            .map(|event| self.decode_log_sync(&event.log))
            .collect()
    }

    /// Batch decode on the blocking thread pool, keeping async callers
    /// responsive for large batches.
    pub async fn decode_logs(&self, logs: Vec<Log>) -> Result<Vec<Option<DecodedEvent>>> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_logs_sync(&logs))
            .await
            .context("Failed to join log decode task")
    }

    pub async fn decode_events(&self, events: Vec<Event>) -> Result<Vec<Option<DecodedEvent>>> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_events_sync(&events))
            .await
            .context("Failed to join event decode task")
    }

    fn decode_log_impl(&self, log: &Log) -> Result<Option<DecodedEvent>, DecodeError> {
        let topic0_hex = log
            .topics
            .first()
            .and_then(|t| t.as_deref())
            .ok_or_else(|| DecodeError::MissingField {
                field: "topics[0]".to_owned(),
            })?;
        let topic0_bytes = decode_prefix_hex(topic0_hex, "topics[0]")?;
        if topic0_bytes.len() != WORD {
            return Err(DecodeError::InvalidHex {
                field: "topics[0]".to_owned(),
            });
        }
        let topic0 = B256::from_slice(&topic0_bytes);

        let Some(candidates) = self.events.get(&topic0) else {
            return Ok(None);
        };

        let mut topics = Vec::with_capacity(log.topics.len().saturating_sub(1));
        for (i, topic) in log.topics.iter().enumerate().skip(1) {
            let field = format!("topics[{}]", i);
            let hex = topic.as_deref().ok_or_else(|| DecodeError::MissingField {
                field: field.clone(),
            })?;
            let bytes = decode_prefix_hex(hex, &field)?;
            if bytes.len() != WORD {
                return Err(DecodeError::InvalidHex { field });
            }
            topics.push(bytes);
        }

        let data_hex = log.data.as_deref().ok_or_else(|| DecodeError::MissingField {
            field: "data".to_owned(),
        })?;
        let data = decode_prefix_hex(data_hex, "data")?;

        let mut last_err = DecodeError::NoMatchingSignature;
        for descriptor in candidates {
            match self.decode_with(descriptor, &topics, &data) {
                Ok(decoded) => return Ok(Some(decoded)),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    fn decode_with(
        &self,
        descriptor: &EventDescriptor,
        topics: &[Vec<u8>],
        data: &[u8],
    ) -> Result<DecodedEvent, DecodeError> {
        let indexed_types: Vec<&AbiType> = descriptor.indexed_types().collect();
        if indexed_types.len() != topics.len() {
            return Err(DecodeError::TopicCountMismatch {
                expected: indexed_types.len(),
                got: topics.len(),
            });
        }

        let mut indexed = Vec::with_capacity(indexed_types.len());
        for (ty, topic) in indexed_types.iter().zip(topics) {
            // Dynamic and multi-word indexed parameters are stored on chain as
            // a hash of the value, which cannot be inverted. Surface the raw
            // topic word instead.
            let value = if ty.is_dynamic() || ty.head_words() != 1 {
                DecodedSolValue::FixedBytes(topic.clone())
            } else {
                decode_head(ty, topic, 0)?
            };
            indexed.push(value);
        }

        let body_types = descriptor.body_types();
        // Some sources serve an empty data section for a lone uint256 body
        // that is zero. Treat it as zero rather than a truncated buffer.
        let body = if data.is_empty() && body_types == [AbiType::Uint(256)] {
            vec![DecodedSolValue::Uint(alloy_primitives::U256::ZERO)]
        } else {
            decode_tuple(&body_types, data)?
        };

        let decoded = DecodedEvent { indexed, body };
        if self.checksummed_addresses {
            Ok(DecodedEvent {
                indexed: decoded
                    .indexed
                    .into_iter()
                    .map(DecodedSolValue::into_checksummed)
                    .collect(),
                body: decoded
                    .body
                    .into_iter()
                    .map(DecodedSolValue::into_checksummed)
                    .collect(),
            })
        } else {
            Ok(decoded)
        }
    }
}

/// Signature-directed call input decoder.
///
/// Matches transaction input on its leading four-byte selector and decodes
/// the rest of the input as the function's parameter tuple.
#[derive(Debug, Clone)]
pub struct CallDecoder {
    functions: Arc<HashMap<[u8; 4], Vec<FunctionDescriptor>>>,
    checksummed_addresses: bool,
}

impl CallDecoder {
    /// Build a decoder from human-readable function signatures, e.g.
    /// `"transfer(address to, uint256 amount)"`.
    pub fn from_signatures<S: AsRef<str>>(signatures: &[S]) -> Result<Self, ParseError> {
        let mut functions: HashMap<[u8; 4], Vec<FunctionDescriptor>> = HashMap::new();
        for signature in signatures {
            let descriptor = FunctionDescriptor::parse(signature.as_ref())?;
            functions
                .entry(descriptor.selector)
                .or_default()
                .push(descriptor);
        }
        Ok(Self {
            functions: Arc::new(functions),
            checksummed_addresses: false,
        })
    }

    pub fn enable_checksummed_addresses(&mut self) {
        self.checksummed_addresses = true;
    }

    pub fn disable_checksummed_addresses(&mut self) {
        self.checksummed_addresses = false;
    }

    /// Decode one call input. Returns `None` when the input is shorter than a
    /// selector, no registered signature matches, or the payload does not fit
    /// any candidate.
    pub fn decode_input_sync(&self, input: &[u8]) -> Option<Vec<DecodedSolValue>> {
        match self.decode_input_impl(input) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("Failed to decode call input: {}", e);
                None
            }
        }
    }

    /// Decode the input of each transaction in a batch. The output is
    /// index-aligned with the input; failures leave a `None` at their
    /// position.
    pub fn decode_transactions_input_sync(
        &self,
        transactions: &[Transaction],
    ) -> Vec<Option<Vec<DecodedSolValue>>> {
        transactions
            .iter()
            .map(|tx| {
                let input = tx.input.as_deref()?;
                let bytes = match decode_prefix_hex(input, "input") {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!("Failed to decode call input: {}", e);
                        return None;
                    }
                };
                self.decode_input_sync(&bytes)
            })
            .collect()
    }

    pub async fn decode_inputs(
        &self,
        inputs: Vec<Vec<u8>>,
    ) -> Result<Vec<Option<Vec<DecodedSolValue>>>> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || {
            inputs
                .iter()
                .map(|input| decoder.decode_input_sync(input))
                .collect()
        })
        .await
        .context("Failed to join call decode task")
    }

    pub async fn decode_transactions_input(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Option<Vec<DecodedSolValue>>>> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_transactions_input_sync(&transactions))
            .await
            .context("Failed to join call decode task")
    }

    fn decode_input_impl(
        &self,
        input: &[u8],
    ) -> Result<Option<Vec<DecodedSolValue>>, DecodeError> {
        if input.len() < 4 {
            return Ok(None);
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&input[..4]);

        let Some(candidates) = self.functions.get(&selector) else {
            return Ok(None);
        };

        let body = &input[4..];
        let mut last_err = DecodeError::NoMatchingSignature;
        for descriptor in candidates {
            match decode_tuple(&descriptor.param_types(), body) {
                Ok(values) => {
                    let values = if self.checksummed_addresses {
                        values
                            .into_iter()
                            .map(DecodedSolValue::into_checksummed)
                            .collect()
                    } else {
                        values
                    };
                    return Ok(Some(values));
                }
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, I256, U256};

    fn log(topics: &[&str], data: &str) -> Log {
        Log {
            topics: topics.iter().map(|t| Some((*t).to_owned())).collect(),
            data: Some(data.to_owned()),
            ..Default::default()
        }
    }

    const MINT_SIG: &str = "Mint(address sender, address indexed owner, int24 indexed tickLower, int24 indexed tickUpper, uint128 amount, uint256 amount0, uint256 amount1)";

    fn mint_log() -> Log {
        log(
            &[
                "0x7a53080ba414158be7ec69b987b5fb7d07dee101fe85488f0853ae16239d0bde",
                "0x000000000000000000000000827922686190790b37229fd06084350e74485b72",
                "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                "0x0000000000000000000000000000000000000000000000000000000000000001",
            ],
            "0x000000000000000000000000827922686190790b37229fd06084350e74485b72\
             000000000000000000000000000000000000000000000000000000000bebae76\
             000000000000000000000000000000000000000000000000000000000000270f\
             000000000000000000000000000000000000000000000000000000000000270f",
        )
    }

    #[test]
    fn decodes_mint_log() {
        let decoder = Decoder::from_signatures(&[MINT_SIG]).unwrap();
        let decoded = decoder.decode_log_sync(&mint_log()).unwrap();

        let owner: Address = "0x827922686190790b37229fd06084350e74485b72"
            .parse()
            .unwrap();
        assert_eq!(decoded.indexed.len(), 3);
        assert_eq!(decoded.indexed[0].as_address(), Some(owner));
        assert_eq!(decoded.indexed[1].as_int(), Some(I256::MINUS_ONE));
        assert_eq!(decoded.indexed[2].as_int(), Some(I256::ONE));

        assert_eq!(decoded.body.len(), 4);
        assert_eq!(decoded.body[0].as_address(), Some(owner));
        assert_eq!(decoded.body[1].as_uint(), Some(U256::from(0x0bebae76u64)));
        assert_eq!(decoded.body[2].as_uint(), Some(U256::from(0x270fu64)));
        assert_eq!(decoded.body[3].as_uint(), Some(U256::from(0x270fu64)));
    }

    #[test]
    fn batch_keeps_index_alignment_on_failures() {
        let decoder = Decoder::from_signatures(&[MINT_SIG]).unwrap();

        let unknown = log(
            &["0x1111111111111111111111111111111111111111111111111111111111111111"],
            "0x",
        );
        // Right topic0 but too few topics for the signature.
        let short = log(
            &["0x7a53080ba414158be7ec69b987b5fb7d07dee101fe85488f0853ae16239d0bde"],
            "0x",
        );

        let decoded = decoder.decode_logs_sync(&[mint_log(), unknown, short, mint_log()]);
        assert_eq!(decoded.len(), 4);
        assert!(decoded[0].is_some());
        assert!(decoded[1].is_none());
        assert!(decoded[2].is_none());
        assert!(decoded[3].is_some());
    }

    #[test]
    fn indexed_dynamic_param_stays_raw_topic() {
        let decoder =
            Decoder::from_signatures(&["Named(string indexed name, uint256 value)"]).unwrap();
        let topic0 = EventDescriptor::parse("Named(string indexed name, uint256 value)")
            .unwrap()
            .topic0;
        let name_hash = "0xa04f322b7658221fcb67a2cf1a1a9ab1f1a9b833b4f751f9de87b26ed63e9a12";
        let entry = log(
            &[&format!("0x{}", alloy_primitives::hex::encode(topic0)), name_hash],
            "0x000000000000000000000000000000000000000000000000000000000000002a",
        );

        let decoded = decoder.decode_log_sync(&entry).unwrap();
        // The hashed topic must be kept as the raw 32-byte word, never
        // reconstructed into a string.
        assert_eq!(
            decoded.indexed[0].as_bytes(),
            Some(alloy_primitives::hex::decode(name_hash).unwrap().as_slice())
        );
        assert_eq!(decoded.body[0].as_uint(), Some(U256::from(42u64)));
    }

    #[test]
    fn split_follows_declaration_order() {
        let decoder =
            Decoder::from_signatures(&["Mixed(uint256 a, address indexed b, uint256 c)"]).unwrap();
        let topic0 = EventDescriptor::parse("Mixed(uint256 a, address indexed b, uint256 c)")
            .unwrap()
            .topic0;
        let entry = log(
            &[
                &format!("0x{}", alloy_primitives::hex::encode(topic0)),
                "0x000000000000000000000000827922686190790b37229fd06084350e74485b72",
            ],
            "0x0000000000000000000000000000000000000000000000000000000000000007\
             0000000000000000000000000000000000000000000000000000000000000009",
        );

        let decoded = decoder.decode_log_sync(&entry).unwrap();
        assert_eq!(decoded.body[0].as_uint(), Some(U256::from(7u64)));
        assert_eq!(decoded.body[1].as_uint(), Some(U256::from(9u64)));
        assert!(decoded.indexed[0].as_address().is_some());
    }

    #[test]
    fn empty_data_for_lone_uint_body_decodes_as_zero() {
        let decoder =
            Decoder::from_signatures(&["Burn(address indexed from, uint256 amount)"]).unwrap();
        let topic0 = EventDescriptor::parse("Burn(address indexed from, uint256 amount)")
            .unwrap()
            .topic0;
        let entry = log(
            &[
                &format!("0x{}", alloy_primitives::hex::encode(topic0)),
                "0x000000000000000000000000827922686190790b37229fd06084350e74485b72",
            ],
            "0x",
        );

        let decoded = decoder.decode_log_sync(&entry).unwrap();
        assert_eq!(decoded.body[0].as_uint(), Some(U256::ZERO));
    }

    #[test]
    fn checksummed_addresses_render_as_strings() {
        let mut decoder = Decoder::from_signatures(&[MINT_SIG]).unwrap();
        decoder.enable_checksummed_addresses();

        let decoded = decoder.decode_log_sync(&mint_log()).unwrap();
        assert_eq!(
            decoded.indexed[0].as_str(),
            Some("0x827922686190790b37229fd06084350E74485b72")
        );

        decoder.disable_checksummed_addresses();
        let decoded = decoder.decode_log_sync(&mint_log()).unwrap();
        assert!(decoded.indexed[0].as_address().is_some());
    }

    #[test]
    fn unregistered_topic0_is_simply_absent() {
        let decoder = Decoder::from_signatures(&[MINT_SIG]).unwrap();
        let entry = log(
            &["0x2222222222222222222222222222222222222222222222222222222222222222"],
            "0x",
        );
        assert!(decoder.decode_log_sync(&entry).is_none());
    }

    #[test]
    fn call_decoder_decodes_transfer_input() {
        let decoder =
            CallDecoder::from_signatures(&["transfer(address to, uint256 amount)"]).unwrap();

        let mut input = alloy_primitives::hex::decode("a9059cbb").unwrap();
        input.extend(
            alloy_primitives::hex::decode(
                "000000000000000000000000827922686190790b37229fd06084350e74485b72\
                 00000000000000000000000000000000000000000000000000000000000003e8",
            )
            .unwrap(),
        );

        let values = decoder.decode_input_sync(&input).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[0].as_address().is_some());
        assert_eq!(values[1].as_uint(), Some(U256::from(1000u64)));
    }

    #[test]
    fn call_decoder_rejects_short_and_unknown_input() {
        let decoder =
            CallDecoder::from_signatures(&["transfer(address to, uint256 amount)"]).unwrap();
        assert!(decoder.decode_input_sync(&[0xa9, 0x05]).is_none());
        assert!(decoder.decode_input_sync(&[0xde, 0xad, 0xbe, 0xef]).is_none());
    }

    #[test]
    fn transactions_input_batch_is_index_aligned() {
        let decoder =
            CallDecoder::from_signatures(&["transfer(address to, uint256 amount)"]).unwrap();

        let good = Transaction {
            input: Some(
                "0xa9059cbb\
                 000000000000000000000000827922686190790b37229fd06084350e74485b72\
                 00000000000000000000000000000000000000000000000000000000000003e8"
                    .to_owned(),
            ),
            ..Default::default()
        };
        let missing = Transaction::default();
        let junk = Transaction {
            input: Some("0xzz".to_owned()),
            ..Default::default()
        };

        let decoded = decoder.decode_transactions_input_sync(&[good, missing, junk]);
        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].is_some());
        assert!(decoded[1].is_none());
        assert!(decoded[2].is_none());
    }

    #[tokio::test]
    async fn async_batch_matches_sync() {
        let decoder = Decoder::from_signatures(&[MINT_SIG]).unwrap();
        let logs = vec![mint_log(), Log::default()];
        let sync = decoder.decode_logs_sync(&logs);
        let from_task = decoder.decode_logs(logs).await.unwrap();
        assert_eq!(sync, from_task);
    }

    #[test]
    fn fragments_match_signature_parsing() {
        let json = r#"[{
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "amount", "type": "uint256", "indexed": false}
            ]
        }]"#;
        let fragments: Vec<EventFragment> = serde_json::from_str(json).unwrap();
        let from_fragments = Decoder::from_fragments(&fragments).unwrap();
        let from_signatures = Decoder::from_signatures(&[
            "Transfer(address indexed from, address indexed to, uint256 amount)",
        ])
        .unwrap();

        let keys: Vec<_> = from_fragments.events.keys().collect();
        assert_eq!(keys.len(), 1);
        assert!(from_signatures.events.contains_key(keys[0]));
    }
}
