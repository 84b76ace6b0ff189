#![no_main]

use hdr_color::IccProfile;

libfuzzer_sys::fuzz_target!(|data: &[u8]| {
    let Ok(profile) = IccProfile::parse(data) else {
        return;
    };

    let encoded = profile.encode();
    let reparsed = IccProfile::parse(&encoded).expect("re-encoded profile should parse");
    assert_eq!(reparsed, profile);
});
