//! Protocol module containing message types, the JSON codec, and queue records.

pub mod codec;
pub mod identity;
pub mod messages;
pub mod record;
pub mod sequence;

pub use codec::{decode_request, decode_response, encode_request, encode_response, ProtocolError};
pub use identity::{parse_guid, ClientIdentity};
pub use messages::*;
pub use record::{append_record, extract_record, take_all_records, QueueRecord};
pub use sequence::SequenceCounter;
