#![no_main]

// Harness: api_outcome
// Any status/body pair folds into exactly one outcome; non-2xx is always Err.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use leave_core::api::ApiOutcome;

#[derive(Arbitrary, Debug)]
struct Response<'a> {
    status: u16,
    body: &'a str,
}

fuzz_target!(|resp: Response<'_>| {
    let outcome: ApiOutcome<serde_json::Value> = ApiOutcome::from_response(resp.status, resp.body);
    if !(200..300).contains(&resp.status) {
        assert!(!outcome.is_ok());
    }
});
