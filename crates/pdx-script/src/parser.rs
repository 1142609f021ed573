use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pdx_cache::{CacheContext, CachePolicy, CacheStats};
use pdx_files::Layers;
use pdx_parse::{ParseError, Parser};
use pdx_tree::{Key, TopLevel, Value};
use tracing::{debug, info, trace};

use crate::{DecodePolicy, Error, ParserConfig, text};

/// Per-call overrides for [`ScriptParser::parse_file_with`]. Unset fields
/// fall back to the parser's [`ParserConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
    pub encoding: Option<&'static encoding_rs::Encoding>,
    pub decode: Option<DecodePolicy>,
    pub memory_cache: Option<bool>,
    pub disk_cache: Option<bool>,
}

impl FileOptions {
    pub fn encoding(mut self, encoding: &'static encoding_rs::Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = Some(decode);
        self
    }

    pub fn memory_cache(mut self, enabled: bool) -> Self {
        self.memory_cache = Some(enabled);
        self
    }

    pub fn disk_cache(mut self, enabled: bool) -> Self {
        self.disk_cache = Some(enabled);
        self
    }
}

/// Entry point for reading and writing script files.
///
/// Owns the cache state for one batch run; hit and miss counts are logged
/// when it is dropped.
pub struct ScriptParser {
    config: ParserConfig,
    layers: Layers,
    cache: CacheContext,
}

impl ScriptParser {
    pub fn new(config: ParserConfig) -> Self {
        let layers = Layers::new(&config.base_dir).with_overrides(&config.override_dirs);
        let cache = CacheContext::new(config.cache_root()).with_base_dir(
            fs::canonicalize(&config.base_dir).unwrap_or_else(|_| config.base_dir.clone()),
        );
        Self {
            config,
            layers,
            cache,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn cache(&mut self) -> &mut CacheContext {
        &mut self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Paths matching `glob` across the base and override directories, in
    /// resolution order.
    pub fn files(&self, glob: &str) -> Result<Vec<PathBuf>, Error> {
        Ok(self.layers.files(glob, false)?)
    }

    /// Like [`files`](Self::files), in descending order.
    pub fn files_reversed(&self, glob: &str) -> Result<Vec<PathBuf>, Error> {
        Ok(self.layers.files(glob, true)?)
    }

    /// The first path matching `glob` in resolution order.
    pub fn first_file(&self, glob: &str) -> Result<PathBuf, Error> {
        self.layers
            .first_file(glob)?
            .ok_or_else(|| Error::NotFound(glob.to_string()))
    }

    /// Parse text directly, without touching the filesystem or the cache.
    pub fn parse(&self, text: &str) -> Result<TopLevel, ParseError> {
        Parser::new(text, self.config.profile)
            .strict(self.config.strict)
            .parse()
    }

    /// Parse one file with the configured defaults.
    ///
    /// A relative path is treated as a glob and resolved across the layers,
    /// taking the first match.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<TopLevel, Error> {
        self.parse_file_with(path, FileOptions::default())
    }

    pub fn parse_file_with(
        &mut self,
        path: impl AsRef<Path>,
        options: FileOptions,
    ) -> Result<TopLevel, Error> {
        let path = path.as_ref();
        let path = if path.is_relative() {
            self.first_file(&path.to_string_lossy())?
        } else {
            path.to_path_buf()
        };
        let path = fs::canonicalize(&path).map_err(Error::io(&path))?;

        let encoding = options.encoding.unwrap_or(self.config.encoding);
        let decode = options.decode.unwrap_or(self.config.decode);
        let policy = CachePolicy {
            memory: options.memory_cache.unwrap_or(self.config.memory_cache),
            disk: options.disk_cache.unwrap_or(self.config.disk_cache),
        };

        let (profile, strict) = (self.config.profile, self.config.strict);
        let read = || read_and_parse(&path, encoding, decode, profile, strict);
        if self.config.ignore_cache || decode == DecodePolicy::Replace {
            trace!(path = %path.display(), "parsing without cache");
            return read();
        }
        self.cache.get_or_parse(&path, encoding.name(), policy, read)
    }

    /// Parse every regular file matching `glob`, lazily, in resolution order.
    pub fn parse_files(&mut self, glob: &str) -> Result<ParseFiles<'_>, Error> {
        let paths = self.files(glob)?;
        Ok(ParseFiles {
            parser: self,
            paths: paths.into_iter(),
        })
    }

    /// Like [`parse_files`](Self::parse_files) over a different set of layers.
    pub fn parse_files_in(&mut self, glob: &str, layers: &Layers) -> Result<ParseFiles<'_>, Error> {
        let paths = layers.files(glob, false)?;
        Ok(ParseFiles {
            parser: self,
            paths: paths.into_iter(),
        })
    }

    /// Merge the top-level pairs of every file matching `glob`. A key seen
    /// again in a later file replaces the earlier value but keeps its
    /// position.
    pub fn merge_parse(&mut self, glob: &str) -> Result<IndexMap<Key, Value>, Error> {
        merge(self.parse_files(glob)?)
    }

    /// Like [`merge_parse`](Self::merge_parse) over a different set of layers.
    pub fn merge_parse_in(
        &mut self,
        glob: &str,
        layers: &Layers,
    ) -> Result<IndexMap<Key, Value>, Error> {
        merge(self.parse_files_in(glob, layers)?)
    }

    /// Print `tree` and write it to `path` in the configured encoding and
    /// line ending, creating parent directories.
    pub fn write(&self, tree: &TopLevel, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let printed = pdx_format::format_tree(tree, &self.config.format);
        let bytes =
            text::encode(&printed, self.config.encoding, self.config.line_ending).ok_or_else(
                || Error::Encode {
                    path: path.to_path_buf(),
                    encoding: self.config.encoding.name(),
                },
            )?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(Error::io(dir))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(Error::io(path))?;
        tmp.write_all(&bytes).map_err(Error::io(path))?;
        tmp.persist(path).map_err(|e| Error::io(path)(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
        Ok(())
    }
}

impl Drop for ScriptParser {
    fn drop(&mut self) {
        if !self.config.ignore_cache {
            info!(stats = %self.cache.stats(), "parse cache");
        }
    }
}

fn merge(parsed: ParseFiles<'_>) -> Result<IndexMap<Key, Value>, Error> {
    let mut merged = IndexMap::new();
    for result in parsed {
        let (_, tree) = result?;
        for pair in tree.pairs() {
            merged.insert(pair.lookup_key(), pair.value.clone());
        }
    }
    Ok(merged)
}

fn read_and_parse(
    path: &Path,
    encoding: &'static encoding_rs::Encoding,
    decode: DecodePolicy,
    profile: pdx_parse::Profile,
    strict: bool,
) -> Result<TopLevel, Error> {
    let bytes = fs::read(path).map_err(Error::io(path))?;
    let text = text::decode(&bytes, encoding, decode).ok_or_else(|| Error::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })?;
    debug!(path = %path.display(), "parsing");
    Parser::new(&text, profile)
        .strict(strict)
        .parse()
        .map_err(|e| Error::syntax(path, text.into_owned(), e))
}

/// Lazy iterator returned by [`ScriptParser::parse_files`].
pub struct ParseFiles<'p> {
    parser: &'p mut ScriptParser,
    paths: std::vec::IntoIter<PathBuf>,
}

impl Iterator for ParseFiles<'_> {
    type Item = Result<(PathBuf, TopLevel), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.paths.by_ref() {
            if !path.is_file() {
                continue;
            }
            let resolved = match fs::canonicalize(&path) {
                Ok(resolved) => resolved,
                Err(e) => return Some(Err(Error::io(&path)(e))),
            };
            return Some(
                self.parser
                    .parse_file(&resolved)
                    .map(|tree| (resolved, tree)),
            );
        }
        None
    }
}
