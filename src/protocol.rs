//! Wire format of the topology negotiation.
//!
//! Request: 4 bytes, big-endian `u32` topology number (`0` = no preference).
//!
//! Response: 4 bytes, big-endian `u32` assigned topology, followed by the
//! routing table. The routing table has no length prefix; it runs until the
//! server closes the connection and is kept as opaque bytes.

use crate::topology::TopologyRequest;

/// Size of the request and of the response header
pub const HEADER_LEN: usize = 4;

/// Errors raised while decoding a server response
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("response too small: only got {received}B")]
    ResponseTooSmall { received: usize },
}

/// Decoded server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationResponse {
    pub assigned_topology: u32,
    pub routing_table: Vec<u8>,
}

/// Encode a topology request for the wire
pub fn encode_request(request: TopologyRequest) -> [u8; HEADER_LEN] {
    request.value().to_be_bytes()
}

/// Decode a complete response read up to EOF
pub fn decode_response(mut raw: Vec<u8>) -> Result<NegotiationResponse, ProtocolError> {
    if raw.len() < HEADER_LEN {
        return Err(ProtocolError::ResponseTooSmall { received: raw.len() });
    }

    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&raw[..HEADER_LEN]);
    raw.drain(..HEADER_LEN);

    Ok(NegotiationResponse {
        assigned_topology: u32::from_be_bytes(header),
        routing_table: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_request_is_big_endian() {
        assert_eq!(encode_request(TopologyRequest::NO_PREFERENCE), [0, 0, 0, 0]);
        assert_eq!(encode_request(TopologyRequest::new(42)), [0, 0, 0, 0x2a]);
        assert_eq!(
            encode_request(TopologyRequest::new(0x0102_0304)),
            [0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(encode_request(TopologyRequest::new(u32::MAX)), [0xff; 4]);
    }

    #[test]
    fn test_decode_header_and_table() {
        let mut raw = vec![0, 0, 0, 7];
        raw.extend_from_slice(b"R1 R2\n");
        let response = decode_response(raw).unwrap();
        assert_eq!(response.assigned_topology, 7);
        assert_eq!(response.routing_table, b"R1 R2\n");
    }

    #[test]
    fn test_decode_header_only() {
        let response = decode_response(vec![0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(response.assigned_topology, 0xdead_beef);
        assert!(response.routing_table.is_empty());
    }

    #[test]
    fn test_decode_keeps_binary_table_verbatim() {
        let table = vec![0x00, 0xff, b'\r', b'\n', 0x80, b'\n'];
        let mut raw = vec![0, 0, 1, 0];
        raw.extend_from_slice(&table);
        let response = decode_response(raw).unwrap();
        assert_eq!(response.assigned_topology, 256);
        assert_eq!(response.routing_table, table);
    }

    #[test]
    fn test_decode_too_small() {
        for len in 0..HEADER_LEN {
            let err = decode_response(vec![1; len]).unwrap_err();
            assert_eq!(err, ProtocolError::ResponseTooSmall { received: len });
        }
        assert_eq!(
            decode_response(Vec::new()).unwrap_err().to_string(),
            "response too small: only got 0B"
        );
    }
}
