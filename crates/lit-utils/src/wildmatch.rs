//! Gitignore-style glob matching.
//!
//! Supports `?`, `*`, the path-spanning `**`, `[...]` bracket classes
//! (ranges, negation, POSIX classes) and `\`-escapes. `PATHNAME` mode
//! keeps `/` out of reach of `?`/`*`/brackets and gives `**` its special
//! whole-segment meaning; without it, `*` and `**` behave identically and
//! happily cross `/`.
//!
//! The matcher below is a small recursive-descent engine over byte
//! slices: instead of threading a pair of cursor indices through the
//! pattern and text arrays, each step consumes a prefix off the front of
//! a slice and recurses on what's left. A `*` hands off to [`eval_star`],
//! which walks candidate split points in the text and asks [`eval`] to
//! confirm the remainder, backtracking through [`Outcome::Retry`] when a
//! nested attempt needs to report "this segment is a dead end, but try
//! spanning across the next `/`" rather than a flat failure.

use bstr::{BStr, BString, ByteSlice};

bitflags::bitflags! {
    /// Flags controlling wildmatch behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WildmatchFlags: u32 {
        /// Case-insensitive matching.
        const CASEFOLD = 0x01;
        /// Don't match '/' with wildcards (pathname mode).
        const PATHNAME = 0x02;
    }
}

/// Result of attempting to match a (sub)pattern against a (sub)text.
///
/// `Stop` means no amount of backtracking anywhere in the pattern can
/// turn this into a match, so it propagates straight out. `Retry` is
/// narrower: it means a single-`*` span just crossed a `/` it wasn't
/// allowed to cross, which only matters to a `*`/`**` loop higher up the
/// call stack, not to a plain literal comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Hit,
    Miss,
    Stop,
    Retry,
}

use Outcome::{Hit, Miss, Retry, Stop};

fn fold(flags: WildmatchFlags, c: u8) -> u8 {
    if flags.contains(WildmatchFlags::CASEFOLD) && c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

fn is_special(c: u8) -> bool {
    matches!(c, b'*' | b'?' | b'[' | b'\\')
}

/// Walk `pattern` and `text` in lockstep, consuming matched prefixes.
///
/// `at_seg_start` is true at the very beginning of the call and again
/// right after consuming a literal `/`; it lets a later `**` tell whether
/// it opens a path segment (its only valid position) or sits mid-segment
/// (where it degrades to an ordinary `*`).
fn eval(flags: WildmatchFlags, pattern: &[u8], text: &[u8], mut at_seg_start: bool) -> Outcome {
    let mut pattern = pattern;
    let mut text = text;
    let pathname = flags.contains(WildmatchFlags::PATHNAME);

    loop {
        let Some((&p, rest)) = pattern.split_first() else {
            return if text.is_empty() { Hit } else { Miss };
        };

        if p != b'*' && text.is_empty() {
            return Stop;
        }

        match p {
            b'\\' => {
                let Some((&lit, after_lit)) = rest.split_first() else {
                    return Stop;
                };
                let (&c, text_rest) = text.split_first().expect("checked non-empty above");
                if fold(flags, c) != fold(flags, lit) {
                    return Miss;
                }
                at_seg_start = lit == b'/';
                pattern = after_lit;
                text = text_rest;
            }
            b'?' => {
                let (&c, text_rest) = text.split_first().expect("checked non-empty above");
                if pathname && c == b'/' {
                    return Miss;
                }
                at_seg_start = false;
                pattern = rest;
                text = text_rest;
            }
            b'*' => return eval_star(flags, pattern, text, at_seg_start),
            b'[' => {
                let t_ch = *text.first().expect("checked non-empty above");
                match eval_bracket(flags, rest, t_ch) {
                    BracketOutcome::Matched(consumed) => {
                        pattern = &rest[consumed..];
                        text = &text[1..];
                        at_seg_start = false;
                    }
                    BracketOutcome::NotMatched(_) => return Miss,
                    BracketOutcome::Malformed => return Stop,
                }
            }
            _ => {
                let (&c, text_rest) = text.split_first().expect("checked non-empty above");
                if fold(flags, c) != fold(flags, p) {
                    return Miss;
                }
                at_seg_start = p == b'/';
                pattern = rest;
                text = text_rest;
            }
        }
    }
}

/// Handle a `*` (or run of `*`s) at the front of `pattern`.
fn eval_star(flags: WildmatchFlags, pattern: &[u8], text: &[u8], at_seg_start: bool) -> Outcome {
    let pathname = flags.contains(WildmatchFlags::PATHNAME);
    let mut after_stars = &pattern[1..];
    let is_double_star = after_stars.first() == Some(&b'*');
    if is_double_star {
        while after_stars.first() == Some(&b'*') {
            after_stars = &after_stars[1..];
        }
    }

    // Whether this star is allowed to span a '/' in the text.
    let spans_slash = if !pathname {
        true
    } else if !is_double_star {
        false
    } else {
        let opens_or_closes_segment = after_stars.is_empty()
            || after_stars[0] == b'/'
            || (after_stars.len() > 1 && after_stars[0] == b'\\' && after_stars[1] == b'/');
        if at_seg_start && opens_or_closes_segment {
            if after_stars.first() == Some(&b'/') && eval(flags, &after_stars[1..], text, true) == Hit {
                return Hit;
            }
            true
        } else {
            // A bare '**' in the middle of a segment is just a '*'.
            false
        }
    };

    if after_stars.is_empty() {
        return if !spans_slash && text.contains(&b'/') { Retry } else { Hit };
    }

    if !spans_slash && after_stars[0] == b'/' {
        return match text.iter().position(|&b| b == b'/') {
            Some(slash) => eval(flags, &after_stars[1..], &text[slash + 1..], true),
            None => Stop,
        };
    }

    let mut text = text;
    while !text.is_empty() {
        if let Some(&literal) = after_stars.first() {
            if !is_special(literal) {
                let want = fold(flags, literal);
                while !text.is_empty() && (spans_slash || text[0] != b'/') && fold(flags, text[0]) != want {
                    text = &text[1..];
                }
                if text.is_empty() || fold(flags, text[0]) != want {
                    return if spans_slash { Stop } else { Retry };
                }
            }
        }

        match eval(flags, after_stars, text, false) {
            Miss => {}
            Retry if spans_slash => {}
            settled => return settled,
        }

        if !spans_slash && text[0] == b'/' {
            return Retry;
        }
        text = &text[1..];
    }

    Stop
}

enum BracketOutcome {
    Matched(usize),
    NotMatched(usize),
    Malformed,
}

/// Match `t_ch` against the `[...]` body in `spec` (everything after the
/// opening `[`). On success or failure that isn't malformed, the `usize`
/// is how many bytes of `spec` the bracket expression occupies, landing
/// just past the closing `]`.
fn eval_bracket(flags: WildmatchFlags, spec: &[u8], t_ch: u8) -> BracketOutcome {
    let t_cmp = fold(flags, t_ch);

    let mut pos = 0;
    let negated = matches!(spec.first(), Some(b'^') | Some(b'!'));
    if negated {
        pos += 1;
    }
    if pos >= spec.len() {
        return BracketOutcome::Malformed;
    }

    let mut hit = false;
    let mut prev: Option<u8> = None;

    loop {
        if pos >= spec.len() {
            return BracketOutcome::Malformed;
        }
        let c = spec[pos];

        if c == b'\\' {
            pos += 1;
            if pos >= spec.len() {
                return BracketOutcome::Malformed;
            }
            let escaped = spec[pos];
            if t_cmp == fold(flags, escaped) {
                hit = true;
            }
            prev = Some(escaped);
        } else if c == b'-' && prev.is_some() && pos + 1 < spec.len() && spec[pos + 1] != b']' {
            pos += 1;
            let mut hi = spec[pos];
            if hi == b'\\' {
                pos += 1;
                if pos >= spec.len() {
                    return BracketOutcome::Malformed;
                }
                hi = spec[pos];
            }
            let lo = prev.expect("guarded by prev.is_some() above");
            if t_cmp >= lo && t_cmp <= hi {
                hit = true;
            } else if flags.contains(WildmatchFlags::CASEFOLD) && t_ch.is_ascii_lowercase() {
                let upper = t_ch.to_ascii_uppercase();
                if upper >= lo && upper <= hi {
                    hit = true;
                }
            }
            prev = None;
        } else if c == b'[' && pos + 1 < spec.len() && spec[pos + 1] == b':' {
            let class_start = pos + 2;
            let mut end = class_start;
            while end < spec.len() && spec[end] != b']' {
                end += 1;
            }
            if end >= spec.len() {
                return BracketOutcome::Malformed;
            }
            if end == 0 || spec[end - 1] != b':' {
                if t_cmp == b'[' {
                    hit = true;
                }
                prev = Some(b'[');
            } else {
                let class_name = &spec[class_start..end - 1];
                if match_posix_class(class_name, t_cmp, flags) {
                    hit = true;
                }
                pos = end;
                prev = None;
            }
        } else {
            if t_cmp == fold(flags, c) {
                hit = true;
            }
            prev = Some(c);
        }

        pos += 1;
        if pos >= spec.len() {
            return BracketOutcome::Malformed;
        }
        if spec[pos] == b']' {
            pos += 1;
            break;
        }
    }

    if hit == negated || (flags.contains(WildmatchFlags::PATHNAME) && t_ch == b'/') {
        BracketOutcome::NotMatched(pos)
    } else {
        BracketOutcome::Matched(pos)
    }
}

fn match_posix_class(class: &[u8], ch: u8, flags: WildmatchFlags) -> bool {
    match class {
        b"alnum" => ch.is_ascii_alphanumeric(),
        b"alpha" => ch.is_ascii_alphabetic(),
        b"blank" => ch == b' ' || ch == b'\t',
        b"cntrl" => ch.is_ascii_control(),
        b"digit" => ch.is_ascii_digit(),
        b"graph" => ch.is_ascii_graphic(),
        b"lower" => ch.is_ascii_lowercase(),
        b"print" => ch.is_ascii_graphic() || ch == b' ',
        b"punct" => ch.is_ascii_punctuation(),
        b"space" => ch.is_ascii_whitespace(),
        b"upper" => ch.is_ascii_uppercase() || (flags.contains(WildmatchFlags::CASEFOLD) && ch.is_ascii_lowercase()),
        b"xdigit" => ch.is_ascii_hexdigit(),
        _ => false,
    }
}

/// A compiled pattern, for matching the same glob against many paths.
#[derive(Debug, Clone)]
pub struct WildmatchPattern {
    pattern: BString,
    flags: WildmatchFlags,
}

impl WildmatchPattern {
    pub fn new(pattern: &BStr, flags: WildmatchFlags) -> Self {
        Self { pattern: pattern.into(), flags }
    }

    pub fn matches(&self, text: &BStr) -> bool {
        wildmatch(self.pattern.as_ref(), text, self.flags)
    }
}

/// Test whether `pattern` matches `text` under `flags`.
pub fn wildmatch(pattern: &BStr, text: &BStr, flags: WildmatchFlags) -> bool {
    eval(flags, pattern.as_bytes(), text.as_bytes(), true) == Hit
}
