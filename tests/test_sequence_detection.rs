//! Sequence detection through the public detector API.

use std::sync::{Arc, Mutex};

use cheatcode::config::Settings;
use cheatcode::detector::Detector;
use cheatcode::matcher::RestartPolicy;
use cheatcode::observability::EventEmitter;
use cheatcode::surface::MemorySurface;
use cheatcode::token::{KeyToken, parse_line};

fn detector(restart: RestartPolicy) -> Detector<MemorySurface> {
    let settings = Settings {
        restart,
        ..Settings::default()
    };
    let surface = Arc::new(Mutex::new(MemorySurface::new()));
    Detector::from_settings(&settings, surface, Arc::new(EventEmitter::noop())).unwrap()
}

fn tokens(line: &str) -> Vec<KeyToken> {
    parse_line(line)
}

/// Feeds every token and returns how many sessions were started.
fn feed(d: &mut Detector<MemorySurface>, input: &[KeyToken]) -> usize {
    input.iter().filter_map(|t| d.on_input_token(t)).count()
}

const KONAMI: &str = "Up Up Down Down Left Right Left Right b a";

#[tokio::test(start_paused = true)]
async fn exact_sequence_plays_once_and_resets_cursor() {
    let mut d = detector(RestartPolicy::default());
    assert_eq!(feed(&mut d, &tokens(KONAMI)), 1);
    assert_eq!(d.matcher().cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn back_to_back_sequences_play_twice() {
    let mut d = detector(RestartPolicy::default());
    let input = tokens(&format!("{KONAMI} {KONAMI}"));
    assert_eq!(feed(&mut d, &input), 2);
    assert_eq!(d.summary().matches, 2);
}

#[tokio::test(start_paused = true)]
async fn extra_leading_up_depends_on_restart_policy() {
    let input = tokens("Up Up Up Down Down Left Right Left Right b a");

    let mut overlap = detector(RestartPolicy::Overlap);
    assert_eq!(feed(&mut overlap, &input), 1);

    let mut strict = detector(RestartPolicy::Strict);
    assert_eq!(feed(&mut strict, &input), 0);
}

#[tokio::test(start_paused = true)]
async fn stream_without_contiguous_target_never_plays() {
    let mut d = detector(RestartPolicy::default());
    let input = tokens("Up Up Down Down Left Right Left Right b x a Up Up Down Down Left Right Left Right a b");
    assert_eq!(feed(&mut d, &input), 0);
    assert_eq!(d.summary().tokens_seen, 21);
}

#[tokio::test(start_paused = true)]
async fn empty_stream_leaves_cursor_at_zero() {
    let mut d = detector(RestartPolicy::default());
    assert_eq!(feed(&mut d, &[]), 0);
    assert_eq!(d.matcher().cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn keys_are_case_sensitive() {
    let mut d = detector(RestartPolicy::default());
    assert_eq!(feed(&mut d, &tokens("up up down down left right left right B A")), 0);
}

#[tokio::test(start_paused = true)]
async fn noise_before_sequence_is_ignored() {
    let mut d = detector(RestartPolicy::FirstToken);
    let input = tokens(&format!("x y Enter {KONAMI}"));
    assert_eq!(feed(&mut d, &input), 1);
}
