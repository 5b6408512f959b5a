//! Fuzz target for `Frame::decode`
//!
//! Arbitrary bytes off the wire must never panic the decoder. Anything that
//! decodes must re-encode to a frame that decodes to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use statwar_proto::Frame;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::decode(data) else {
        return;
    };

    let mut buf = Vec::with_capacity(frame.encoded_len());
    frame.encode(&mut buf).expect("decoded frame must re-encode");
    assert_eq!(buf.len(), frame.encoded_len());
    assert_eq!(Frame::decode(&buf).expect("re-encoded frame must decode"), frame);
});
