#![no_main]

// Harness: decode_frame
// Arbitrary text must either fail to decode or survive an encode/decode
// round-trip unchanged, and dispatching it must never panic.

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use leave_core::events::{decode_frame, encode_frame, EventDispatcher, TracingNotifier};

fuzz_target!(|text: &str| {
    if let Ok(frame) = decode_frame(text) {
        let re = encode_frame(&frame);
        assert_eq!(decode_frame(&re).ok(), Some(frame.clone()));

        let mut dispatcher = EventDispatcher::new(Arc::new(TracingNotifier));
        dispatcher.subscribe_all();
        dispatcher.dispatch_frame(&frame);
    }
});
