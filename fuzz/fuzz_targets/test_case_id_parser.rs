#![no_main]

use benchdiff::test_case_id::TestCaseId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing never fails, whatever the input
        let id = TestCaseId::parse(input);
        let reparsed = TestCaseId::parse(&id.display_name());
        assert_eq!(reparsed.cmp(&reparsed), std::cmp::Ordering::Equal);
    }
});
