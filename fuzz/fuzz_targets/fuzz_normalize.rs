#![no_main]

use libfuzzer_sys::fuzz_target;
use oplookup::normalize::{alias_keys, match_form, normalize_key};

fuzz_target!(|data: &str| {
    // Both forms must be fixed points of themselves
    let key = normalize_key(data);
    assert_eq!(normalize_key(&key), key);

    let form = match_form(data);
    assert_eq!(match_form(&form), form);

    for alias in alias_keys(&key, data) {
        assert!(!alias.is_empty());
        assert_ne!(alias, key);
    }
});
