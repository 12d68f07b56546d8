//! Broad acceptance corpus for the gitignore-style glob matcher, covering
//! the same ground as C git's t3070-wildmatch.sh but organized as
//! table-driven cases rather than call-by-call assertions.

use bstr::BStr;
use lit_utils::wildmatch::{wildmatch, WildmatchFlags};

struct Case {
    pattern: &'static [u8],
    text: &'static [u8],
    flags: WildmatchFlags,
    expect: bool,
}

fn run(cases: &[Case]) {
    for (i, case) in cases.iter().enumerate() {
        let got = wildmatch(BStr::new(case.pattern), BStr::new(case.text), case.flags);
        assert_eq!(
            got,
            case.expect,
            "case {i}: pattern={:?} text={:?} flags={:?} expected {} got {}",
            String::from_utf8_lossy(case.pattern),
            String::from_utf8_lossy(case.text),
            case.flags,
            case.expect,
            got,
        );
    }
}

const NONE: WildmatchFlags = WildmatchFlags::empty();
const PATHNAME: WildmatchFlags = WildmatchFlags::PATHNAME;
const CASEFOLD: WildmatchFlags = WildmatchFlags::CASEFOLD;

#[test]
fn literals_and_empty_pattern() {
    run(&[
        Case { pattern: b"foo", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"foo", text: b"bar", flags: NONE, expect: false },
        Case { pattern: b"", text: b"", flags: NONE, expect: true },
        Case { pattern: b"", text: b"x", flags: NONE, expect: false },
    ]);
}

#[test]
fn single_star_spans_within_bounds() {
    run(&[
        Case { pattern: b"*", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"*", text: b"", flags: NONE, expect: true },
        Case { pattern: b"f*", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"*o", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"f*o", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"f*o", text: b"fo", flags: NONE, expect: true },
        Case { pattern: b"f*o", text: b"f", flags: NONE, expect: false },
    ]);
}

#[test]
fn question_mark_consumes_exactly_one_byte() {
    run(&[
        Case { pattern: b"?", text: b"a", flags: NONE, expect: true },
        Case { pattern: b"?", text: b"", flags: NONE, expect: false },
        Case { pattern: b"??", text: b"ab", flags: NONE, expect: true },
        Case { pattern: b"??", text: b"a", flags: NONE, expect: false },
        Case { pattern: b"?o?", text: b"foo", flags: NONE, expect: true },
    ]);
}

#[test]
fn bracket_expressions() {
    run(&[
        Case { pattern: b"[abc]", text: b"a", flags: NONE, expect: true },
        Case { pattern: b"[abc]", text: b"b", flags: NONE, expect: true },
        Case { pattern: b"[abc]", text: b"c", flags: NONE, expect: true },
        Case { pattern: b"[abc]", text: b"d", flags: NONE, expect: false },
        Case { pattern: b"[a-c]", text: b"b", flags: NONE, expect: true },
        Case { pattern: b"[a-c]", text: b"d", flags: NONE, expect: false },
        Case { pattern: b"[!abc]", text: b"d", flags: NONE, expect: true },
        Case { pattern: b"[!abc]", text: b"a", flags: NONE, expect: false },
    ]);
}

#[test]
fn single_star_is_blocked_by_path_separators_in_pathname_mode() {
    run(&[
        Case { pattern: b"*", text: b"foo/bar", flags: NONE, expect: true },
        Case { pattern: b"*", text: b"foo/bar", flags: PATHNAME, expect: false },
        Case { pattern: b"*/*", text: b"foo/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"*/*", text: b"foo/bar/baz", flags: PATHNAME, expect: false },
        Case { pattern: b"*/*/*", text: b"foo/bar/baz", flags: PATHNAME, expect: true },
    ]);
}

#[test]
fn double_star_crosses_segment_boundaries() {
    run(&[
        Case { pattern: b"**", text: b"foo", flags: PATHNAME, expect: true },
        Case { pattern: b"**", text: b"foo/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"**", text: b"foo/bar/baz", flags: PATHNAME, expect: true },
        Case { pattern: b"**/bar", text: b"bar", flags: PATHNAME, expect: true },
        Case { pattern: b"**/bar", text: b"foo/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"**/bar", text: b"foo/baz/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"foo/**", text: b"foo/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"foo/**", text: b"foo/bar/baz", flags: PATHNAME, expect: true },
        Case { pattern: b"foo/**/bar", text: b"foo/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"foo/**/bar", text: b"foo/baz/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"foo/**/bar", text: b"foo/x/y/bar", flags: PATHNAME, expect: true },
        Case { pattern: b"a/**/b", text: b"a/x/y/c", flags: PATHNAME, expect: false },
        Case { pattern: b"**/foo", text: b"a/b/foobar", flags: PATHNAME, expect: false },
    ]);
}

#[test]
fn casefold_widens_literal_and_range_comparisons() {
    run(&[
        Case { pattern: b"foo", text: b"FOO", flags: NONE, expect: false },
        Case { pattern: b"foo", text: b"FOO", flags: CASEFOLD, expect: true },
        Case { pattern: b"FOO", text: b"foo", flags: CASEFOLD, expect: true },
        Case { pattern: b"[a-z]", text: b"A", flags: CASEFOLD, expect: true },
    ]);
}

#[test]
fn escapes_and_edge_positions() {
    run(&[
        Case { pattern: b"\\*", text: b"*", flags: NONE, expect: true },
        Case { pattern: b"\\?", text: b"?", flags: NONE, expect: true },
        Case { pattern: b"foo*", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"foo*", text: b"foobar", flags: NONE, expect: true },
        Case { pattern: b"*foo", text: b"foo", flags: NONE, expect: true },
        Case { pattern: b"*foo", text: b"barfoo", flags: NONE, expect: true },
        Case { pattern: b"*", text: b".hidden", flags: NONE, expect: true },
        Case { pattern: b".*", text: b".hidden", flags: NONE, expect: true },
    ]);
}

#[test]
fn posix_character_classes() {
    run(&[
        Case { pattern: b"[[:alpha:]]", text: b"a", flags: NONE, expect: true },
        Case { pattern: b"[[:alpha:]]", text: b"Z", flags: NONE, expect: true },
        Case { pattern: b"[[:alpha:]]", text: b"1", flags: NONE, expect: false },
        Case { pattern: b"[[:digit:]]", text: b"5", flags: NONE, expect: true },
        Case { pattern: b"[[:digit:]]", text: b"a", flags: NONE, expect: false },
        Case { pattern: b"[[:alnum:]]", text: b"a", flags: NONE, expect: true },
        Case { pattern: b"[[:alnum:]]", text: b"5", flags: NONE, expect: true },
        Case { pattern: b"[[:alnum:]]", text: b"!", flags: NONE, expect: false },
    ]);
}

#[test]
fn gitignore_style_patterns_against_realistic_paths() {
    run(&[
        Case { pattern: b"*.log", text: b"debug.log", flags: NONE, expect: true },
        Case { pattern: b"*.log", text: b"logs/debug.log", flags: PATHNAME, expect: false },
        Case { pattern: b"**/*.log", text: b"logs/debug.log", flags: PATHNAME, expect: true },
        Case { pattern: b"build/**", text: b"build/obj/main.o", flags: PATHNAME, expect: true },
        Case { pattern: b"!README.md", text: b"README.md", flags: NONE, expect: false },
    ]);
}
