use std::path::PathBuf;

use encoding_rs::{Encoding, WINDOWS_1252};
use pdx_format::FormatOptions;
use pdx_parse::Profile;

/// What to do with bytes that are invalid in the configured encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Fail with [`Error::Decode`](crate::Error::Decode).
    #[default]
    Strict,
    /// Substitute U+FFFD. Trees decoded this way are never cached.
    Replace,
}

/// Line ending written by [`ScriptParser::write`](crate::ScriptParser::write).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Settings for a [`ScriptParser`](crate::ScriptParser).
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Tokenizer profile. `Full` keeps comments.
    pub profile: Profile,
    /// Reject objects missing their closing brace.
    pub strict: bool,
    /// Encoding used to read and write files.
    pub encoding: &'static Encoding,
    pub decode: DecodePolicy,
    /// Keep parsed trees in memory for the parser's lifetime.
    pub memory_cache: bool,
    /// Read and write cache entries on disk.
    pub disk_cache: bool,
    /// Bypass both cache tiers.
    pub ignore_cache: bool,
    pub cache_dir: PathBuf,
    pub line_ending: LineEnding,
    pub format: FormatOptions,
    pub base_dir: PathBuf,
    /// Override directories, lowest priority first; the last one wins.
    pub override_dirs: Vec<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Full,
            strict: true,
            encoding: WINDOWS_1252,
            decode: DecodePolicy::Strict,
            memory_cache: false,
            disk_cache: true,
            ignore_cache: false,
            cache_dir: default_cache_dir(),
            line_ending: LineEnding::CrLf,
            format: FormatOptions::default(),
            base_dir: PathBuf::from("."),
            override_dirs: Vec::new(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pdx-script")
}

impl ParserConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    pub fn memory_cache(mut self, enabled: bool) -> Self {
        self.memory_cache = enabled;
        self
    }

    pub fn disk_cache(mut self, enabled: bool) -> Self {
        self.disk_cache = enabled;
        self
    }

    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore_cache = ignore;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Set the override directories, lowest priority first.
    pub fn override_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.override_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Cache root for this configuration. Profiles and strictness produce
    /// different trees, so each gets its own directory.
    pub fn cache_root(&self) -> PathBuf {
        let mut name = self.profile.name().to_string();
        if !self.strict {
            name.push_str("-lenient");
        }
        self.cache_dir.join(name)
    }
}
