//! Log redaction for credentials
//!
//! Every formatted log line passes through [`RedactionPatterns::redact`]
//! before it reaches stderr.

use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;

/// Regex patterns for redacting sensitive data
pub struct RedactionPatterns {
    rules: Vec<(Regex, &'static str)>,
}

impl RedactionPatterns {
    /// Compile all patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    pub fn new() -> Result<Self, regex::Error> {
        let rules = vec![
            // Telegram bot token inside API URLs
            (
                Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
                "$1[TELEGRAM_TOKEN]$3",
            ),
            (
                Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
                "[TELEGRAM_TOKEN]",
            ),
            (
                Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
                "$1[TELEGRAM_TOKEN]",
            ),
            (
                Regex::new(r"GOOGLE_CLIENT_SECRET=[^\s&]+")?,
                "GOOGLE_CLIENT_SECRET=[MASKED]",
            ),
            (
                Regex::new(r"GOOGLE_REFRESH_TOKEN=[^\s&]+")?,
                "GOOGLE_REFRESH_TOKEN=[MASKED]",
            ),
            (
                Regex::new(r"(client_secret|refresh_token|access_token)=[^\s&]+")?,
                "$1=[MASKED]",
            ),
            // OAuth access and refresh tokens in free text
            (Regex::new(r"ya29\.[A-Za-z0-9_.-]+")?, "[GOOGLE_ACCESS_TOKEN]"),
            (Regex::new(r"1//[A-Za-z0-9_-]{20,}")?, "[GOOGLE_REFRESH_TOKEN]"),
        ];

        Ok(Self { rules })
    }

    /// Apply every rule to `input`
    #[must_use]
    pub fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        for (pattern, replacement) in &self.rules {
            output = pattern.replace_all(&output, *replacement).into_owned();
        }
        output
    }
}

/// Writer that redacts every buffer before forwarding it
pub struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length, the redacted text may differ in size
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `MakeWriter` wrapping another writer factory with redaction
pub struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    /// Wrap `make_inner`
    pub const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}
