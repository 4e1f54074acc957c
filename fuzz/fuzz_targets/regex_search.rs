#![no_main]
use libfuzzer_sys::fuzz_target;
use regx::Regex;

// The first line of the input is the pattern, and the rest is the text to search
fuzz_target!(|data: &str| {
    let (pattern, text) = data.split_once('\n').unwrap_or((data, ""));
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => return,
    };

    let text: Vec<char> = text.chars().collect();
    for start in [0, text.len() / 2, text.len()] {
        if let Some(m) = re.search_forward(&text[..], start, None) {
            assert!(m.start() <= m.end() && m.end() <= text.len());
        }
        if let Some(m) = re.search_backward(&text[..], start) {
            assert!(m.start() <= m.end() && m.end() <= text.len());
        }
    }
});
