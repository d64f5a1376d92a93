//! Delimiter guessing for unknown delimited text

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;

use super::encoding::TextEncoding;

/// Bytes read from the head of a file for sniffing
pub const SAMPLE_SIZE: usize = 4096;

/// Candidate delimiters, in order of preference when equally consistent
const CANDIDATES: [char; 5] = [',', '\t', ';', '|', ':'];

/// Share of sample lines that must agree on a delimiter count
const MIN_CONSISTENCY: f64 = 0.9;

/// Read the head of a file. Errors yield an empty sample.
pub fn read_sample(path: &Path) -> Vec<u8> {
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    let result = File::open(path).and_then(|file| file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample));
    match result {
        Ok(_) => sample,
        Err(_) => Vec::new(),
    }
}

/// Guess the field delimiter of a text file.
///
/// Returns `None` when the file cannot be sampled or no delimiter is evident;
/// callers fall back to a comma.
pub fn guess_delimiter(path: &Path) -> Option<u8> {
    let bytes = read_sample(path);
    let truncated = bytes.len() == SAMPLE_SIZE;
    let sample = TextEncoding::SAMPLE_ORDER
        .iter()
        .find_map(|enc| enc.decode_prefix(&bytes))?;
    guess_from_sample(&sample, truncated)
}

/// Guess the delimiter of an in-memory sample
pub fn guess_from_sample(sample: &str, truncated: bool) -> Option<u8> {
    if sample.is_empty() {
        return None;
    }
    sniff_dialect(sample, truncated).or_else(|| count_fallback(sample))
}

/// True when the sample has tabs and at least as many tabs as commas
pub fn looks_tab_delimited(path: &Path) -> bool {
    let sample = read_sample(path);
    let tabs = sample.iter().filter(|&&b| b == b'\t').count();
    let commas = sample.iter().filter(|&&b| b == b',').count();
    tabs > 0 && tabs >= commas
}

/// Pick the candidate whose per-line count is most uniform across the sample
fn sniff_dialect(sample: &str, truncated: bool) -> Option<u8> {
    let mut lines: Vec<&str> = sample.lines().collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    lines.retain(|line| !line.trim().is_empty());
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<(char, f64)> = None;
    for &candidate in &CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();
        let Some((modal, agreeing)) = modal_count(&counts) else {
            continue;
        };
        if modal == 0 {
            continue;
        }
        let consistency = agreeing as f64 / counts.len() as f64;
        if consistency < MIN_CONSISTENCY {
            continue;
        }
        // strictly greater keeps the earlier candidate on ties
        if best.map_or(true, |(_, score)| consistency > score) {
            best = Some((candidate, consistency));
        }
    }
    best.map(|(delimiter, _)| delimiter as u8)
}

/// Raw comma/tab comparison used when the dialect sniff finds nothing.
/// Comma wins a tie.
fn count_fallback(sample: &str) -> Option<u8> {
    let commas = sample.matches(',').count();
    let tabs = sample.matches('\t').count();
    match (commas, tabs) {
        (0, 0) => None,
        (_, 0) => Some(b','),
        (0, _) => Some(b'\t'),
        (c, t) if c >= t => Some(b','),
        _ => Some(b'\t'),
    }
}

fn count_unquoted(line: &str, delimiter: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Most common value and how many entries hold it; larger values win ties
fn modal_count(counts: &[usize]) -> Option<(usize, usize)> {
    let mut frequency: FxHashMap<usize, usize> = FxHashMap::default();
    for &count in counts {
        *frequency.entry(count).or_default() += 1;
    }
    frequency
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
}
