//! The per-byte match engine.
//!
//! [`Matcher::next_byte`] transforms the input into a stream of
//! `(byte, matched)` pairs: every input byte is reported exactly once, in
//! order, tagged with whether it participates in a match.  Three behaviors
//! share one state machine:
//!
//! - **pass-through** — no search configured; every byte reports unmatched;
//! - **fixed pattern** — a byte pattern (string or laid-out numeric key)
//!   matched with at most one byte of push-back, using the KMP table to
//!   avoid re-reading input after a partial-match failure;
//! - **strings** — runs of "printable-ish" characters of a minimum length,
//!   optionally UTF-8-aware and optionally requiring a `NUL` terminator.
//!
//! Captured candidate bytes are parked in a growable buffer and drained to
//! the caller once their fate is known; the buffer never grows past the
//! longest candidate actually observed.

use crate::config::{Config, Search, StringsOpts};
use crate::io::ByteSource;
use crate::kmp::kmp_build;
use crate::utf8::{utf8_is_cont, utf8_len};

/// Strings-mode parameters, fixed for the run.
#[derive(Debug, Clone, Copy)]
struct StringsParams {
    min_chars: u64,
    opts: StringsOpts,
    utf8: bool,
}

/// What to do once the current drain completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    /// Candidate fully resolved: clear the buffer and read fresh input.
    Reading,
    /// Keep the trailing `kmp` bytes as an already-matched pattern prefix.
    Matching { kmp: usize },
    /// The stream is exhausted.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No candidate in progress.
    Reading,
    /// A candidate match is being extended.
    Matching,
    /// Captured bytes are being reported to the caller.
    Draining {
        next: usize,
        end: usize,
        /// Bytes below this index report as matched.
        matched_end: usize,
        resume: Resume,
    },
    Done,
}

pub struct Matcher {
    src: ByteSource,
    /// Fixed search pattern; empty in pass-through and strings modes.
    pattern: Vec<u8>,
    kmps: Vec<usize>,
    fold_case: bool,
    strings: Option<StringsParams>,
    /// Captured, not-yet-reported bytes.
    buf: Vec<u8>,
    /// Fixed mode: number of pattern bytes currently matched.
    buf_pos: usize,
    /// Strings mode: complete characters in the current run.
    string_chars: u64,
    /// Strings mode: total bytes of the character being assembled.
    utf8_char_bytes: usize,
    /// Strings mode: bytes of that character still expected.
    utf8_char_bytes_left: usize,
    phase: Phase,
    total_matches: u64,
}

impl Matcher {
    /// Builds the engine for the run described by `config`.
    pub fn new(src: ByteSource, config: &Config) -> Matcher {
        match &config.search {
            Search::None => Matcher::pass_through(src),
            Search::Pattern(pattern) => {
                let kmps = kmp_build(pattern);
                Matcher {
                    src,
                    buf: Vec::with_capacity(pattern.len()),
                    pattern: pattern.clone(),
                    kmps,
                    fold_case: config.ignore_case,
                    strings: None,
                    buf_pos: 0,
                    string_chars: 0,
                    utf8_char_bytes: 0,
                    utf8_char_bytes_left: 0,
                    phase: Phase::Reading,
                    total_matches: 0,
                }
            }
            Search::Strings { min_chars, opts } => Matcher {
                src,
                pattern: Vec::new(),
                kmps: Vec::new(),
                fold_case: false,
                strings: Some(StringsParams {
                    min_chars: *min_chars,
                    opts: *opts,
                    utf8: config.utf8,
                }),
                buf: Vec::with_capacity(16),
                buf_pos: 0,
                string_chars: 0,
                utf8_char_bytes: 0,
                utf8_char_bytes_left: 0,
                phase: Phase::Reading,
                total_matches: 0,
            },
        }
    }

    /// Builds a null-pattern engine that tags every byte unmatched.
    pub fn pass_through(src: ByteSource) -> Matcher {
        Matcher {
            src,
            pattern: Vec::new(),
            kmps: Vec::new(),
            fold_case: false,
            strings: None,
            buf: Vec::new(),
            buf_pos: 0,
            string_chars: 0,
            utf8_char_bytes: 0,
            utf8_char_bytes_left: 0,
            phase: Phase::Reading,
            total_matches: 0,
        }
    }

    /// Number of completed matches so far.
    #[inline]
    pub fn total_matches(&self) -> u64 {
        self.total_matches
    }

    /// Reports the next `(byte, matched)` pair, or `None` once the input is
    /// exhausted and every captured byte has been reported.
    pub fn next_byte(&mut self) -> Option<(u8, bool)> {
        loop {
            match self.phase {
                Phase::Done => return None,

                Phase::Draining {
                    ref mut next,
                    end,
                    matched_end,
                    resume,
                } => {
                    if *next < end {
                        let b = self.buf[*next];
                        let matched = *next < matched_end;
                        *next += 1;
                        return Some((b, matched));
                    }
                    match resume {
                        Resume::Reading => {
                            self.buf.clear();
                            self.buf_pos = 0;
                            self.phase = Phase::Reading;
                        }
                        Resume::Matching { kmp } => {
                            self.buf.drain(..end);
                            self.buf_pos = kmp;
                            self.phase = if kmp == 0 { Phase::Reading } else { Phase::Matching };
                        }
                        Resume::Done => self.phase = Phase::Done,
                    }
                }

                Phase::Reading => {
                    let Some(b) = self.src.get() else {
                        self.phase = Phase::Done;
                        return None;
                    };
                    if let Some(params) = self.strings {
                        if let Some(pair) = self.strings_read(params, b) {
                            return Some(pair);
                        }
                    } else if self.pattern.is_empty() {
                        return Some((b, false));
                    } else if self.byte_eq(b, self.pattern[0]) {
                        self.buf.push(b);
                        self.buf_pos = 1;
                        self.candidate_advanced();
                    } else {
                        return Some((b, false));
                    }
                }

                Phase::Matching => {
                    if let Some(params) = self.strings {
                        self.strings_extend(params);
                    } else {
                        self.pattern_extend();
                    }
                }
            }
        }
    }

    /// Compares an input byte against a pattern byte, folding case when
    /// requested (the pattern itself is pre-folded by the resolver).
    #[inline]
    fn byte_eq(&self, input: u8, pat: u8) -> bool {
        if self.fold_case {
            input.to_ascii_lowercase() == pat
        } else {
            input == pat
        }
    }

    // ── Fixed-pattern mode ────────────────────────────────────────────────────

    /// After a successful pattern-byte capture: complete the match or keep
    /// extending.
    fn candidate_advanced(&mut self) {
        if self.buf_pos == self.pattern.len() {
            self.total_matches += 1;
            self.phase = Phase::Draining {
                next: 0,
                end: self.buf.len(),
                matched_end: self.buf.len(),
                resume: Resume::Reading,
            };
        } else {
            self.phase = Phase::Matching;
        }
    }

    fn pattern_extend(&mut self) {
        let Some(b) = self.src.get() else {
            // EOF mid-candidate: nothing more can match.
            self.phase = Phase::Draining {
                next: 0,
                end: self.buf.len(),
                matched_end: 0,
                resume: Resume::Done,
            };
            return;
        };
        if self.byte_eq(b, self.pattern[self.buf_pos]) {
            self.buf.push(b);
            self.buf_pos += 1;
            self.candidate_advanced();
        } else {
            // The failing byte is re-read after the drain; the kmps entry
            // tells how much of the captured tail is already re-matched.
            self.src.unget(b);
            let kmp = self.kmps[self.buf_pos];
            self.phase = Phase::Draining {
                next: 0,
                end: self.buf_pos - kmp,
                matched_end: 0,
                resume: Resume::Matching { kmp },
            };
        }
    }

    // ── Strings mode ──────────────────────────────────────────────────────────

    /// Returns `true` when `b` can extend a run as a single-byte character.
    #[inline]
    fn strings_accepts_ascii(params: &StringsParams, b: u8) -> bool {
        matches!(b, 0x21..=0x7E) || params.opts.allows_whitespace(b)
    }

    /// Handles a byte read in [`Phase::Reading`]: either starts a run or
    /// reports the byte unmatched.
    fn strings_read(&mut self, params: StringsParams, b: u8) -> Option<(u8, bool)> {
        if Self::strings_accepts_ascii(&params, b) {
            self.buf.push(b);
            self.string_chars = 1;
            self.utf8_char_bytes = 0;
            self.utf8_char_bytes_left = 0;
            self.phase = Phase::Matching;
            None
        } else if params.utf8 && utf8_len(b) >= 2 {
            self.buf.push(b);
            self.string_chars = 0;
            self.utf8_char_bytes = utf8_len(b);
            self.utf8_char_bytes_left = self.utf8_char_bytes - 1;
            self.phase = Phase::Matching;
            None
        } else {
            Some((b, false))
        }
    }

    fn strings_extend(&mut self, params: StringsParams) {
        let Some(b) = self.src.get() else {
            // EOF closes the run; a required NUL terminator was never seen.
            let partial = if self.utf8_char_bytes_left > 0 {
                self.utf8_char_bytes - self.utf8_char_bytes_left
            } else {
                0
            };
            self.close_run(params, self.buf.len() - partial, !params.opts.null_terminated, Resume::Done);
            return;
        };

        if self.utf8_char_bytes_left > 0 {
            if utf8_is_cont(b) {
                self.buf.push(b);
                self.utf8_char_bytes_left -= 1;
                if self.utf8_char_bytes_left == 0 {
                    self.string_chars += 1;
                }
            } else {
                // Aborted character: its bytes report unmatched, and the run
                // cannot satisfy a NUL-terminator requirement because the
                // partial character sits between the run and the terminator.
                self.src.unget(b);
                let partial = self.utf8_char_bytes - self.utf8_char_bytes_left;
                self.close_run(
                    params,
                    self.buf.len() - partial,
                    !params.opts.null_terminated,
                    Resume::Reading,
                );
            }
            return;
        }

        if Self::strings_accepts_ascii(&params, b) {
            self.buf.push(b);
            self.string_chars += 1;
        } else if params.utf8 && utf8_len(b) >= 2 {
            self.buf.push(b);
            self.utf8_char_bytes = utf8_len(b);
            self.utf8_char_bytes_left = self.utf8_char_bytes - 1;
        } else {
            self.src.unget(b);
            let terminated = !params.opts.null_terminated || b == 0x00;
            self.close_run(params, self.buf.len(), terminated, Resume::Reading);
        }
    }

    /// Ends the current run.  `complete_len` is the byte length of the whole
    /// characters in the buffer; `terminated` reflects the terminator rule.
    fn close_run(&mut self, params: StringsParams, complete_len: usize, terminated: bool, resume: Resume) {
        let matched = terminated && self.string_chars >= params.min_chars;
        if matched {
            self.total_matches += 1;
        }
        self.phase = Phase::Draining {
            next: 0,
            end: self.buf.len(),
            matched_end: if matched { complete_len } else { 0 },
            resume,
        };
        self.utf8_char_bytes = 0;
        self.utf8_char_bytes_left = 0;
        self.string_chars = 0;
    }
}
