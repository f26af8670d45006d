//! # Algorithms Module
//!
//! Pure encoding logic: endpoint classification, envelope framing and
//! callback decoding. No I/O.

pub mod callback_codec;
pub mod endpoint_codec;
pub mod envelope_builder;

pub use callback_codec::{encode_callback, parse_callback};
pub use endpoint_codec::{
    classify_verb, decode_endpoint, encode_endpoint, encode_endpoint_with, endpoint_to_bytes,
    SERVICE_ROUTING, VERB_INVOKE, VERB_TX,
};
pub use envelope_builder::{parse_call_arguments, parse_service_input, RequestEnvelopeBuilder};
