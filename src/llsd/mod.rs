//! LLSD codecs for the value model
//!
//! LLSD is the structured-data format used on the HTTP side of the protocol:
//! capability request/response bodies and the event-queue transport. Both
//! the XML and binary encodings map directly onto `Value`.

pub mod binary;
pub mod xml;
