#![no_main]

use cheatcode::matcher::{RestartPolicy, SequenceMatcher};
use cheatcode::token::KeyToken;
use libfuzzer_sys::fuzz_target;

const ALPHABET: [&str; 4] = ["ArrowUp", "ArrowDown", "b", "a"];

fn token(byte: u8) -> KeyToken {
    KeyToken::new(ALPHABET[usize::from(byte) % ALPHABET.len()])
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let target_len = (usize::from(split) % 8 + 1).min(rest.len());
    let (target, stream) = rest.split_at(target_len);
    if target.is_empty() {
        return;
    }

    for policy in [RestartPolicy::Strict, RestartPolicy::FirstToken, RestartPolicy::Overlap] {
        let tokens = target.iter().copied().map(token).collect();
        let Ok(mut matcher) = SequenceMatcher::new(tokens, policy) else {
            return;
        };
        for &b in stream {
            matcher.feed(&token(b));
            assert!(matcher.cursor() < matcher.len());
        }
    }
});
