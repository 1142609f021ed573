use std::fs;
use std::path::Path;

use encoding_rs::UTF_8;
use pdx_script::tree::{Date, Key, Pair, TopLevel, Value};
use pdx_script::{
    DecodePolicy, Error, FileOptions, Layers, LineEnding, ParserConfig, Profile, ScriptParser,
};
use pdx_testhelpers::Corpus;
use tempfile::TempDir;

/// A parser over `corpus/base` with an isolated cache directory.
fn new_parser(corpus: &Corpus, cache: &TempDir) -> ScriptParser {
    ScriptParser::new(config(corpus, cache))
}

fn config(corpus: &Corpus, cache: &TempDir) -> ParserConfig {
    ParserConfig::new(corpus.join("base")).cache_dir(cache.path())
}

fn setup() -> (Corpus, TempDir) {
    let corpus = Corpus::new();
    corpus.mkdir("base");
    (corpus, tempfile::tempdir().unwrap())
}

fn rel(corpus: &Corpus, path: &Path) -> String {
    let root = fs::canonicalize(corpus.path()).unwrap();
    let path = fs::canonicalize(path).unwrap();
    path.strip_prefix(root)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}

#[test]
fn parse_text_is_last_wins_but_keeps_every_item() {
    let (corpus, cache) = setup();
    let parser = new_parser(&corpus, &cache);
    let tree = parser.parse("a=1 a=2").unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get("a").and_then(Value::as_i64), Some(2));
    assert_eq!(fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[test]
fn parse_dates() {
    let (corpus, cache) = setup();
    let tree = new_parser(&corpus, &cache)
        .parse("1066.9.14 = { x = ..5 }")
        .unwrap();
    let pair = &tree.pairs().next().unwrap();
    assert_eq!(Key::from(&pair.key.value), Key::Date(Date::new(1066, 9, 14)));
    let inner = pair.value.as_object().unwrap();
    assert_eq!(inner.get("x").and_then(Value::as_date), Some(Date::new(0, 0, 5)));
}

#[test]
fn replace_path_precedence() {
    let (corpus, cache) = setup();
    corpus.write("base/p/x.txt", "x = base");
    corpus.write("base/p/y.txt", "y = base");
    corpus.write("mod/p/x.txt", "x = mod");
    corpus.write("mod/mine.mod", "replace_path = \"p\"");

    let config = config(&corpus, &cache).override_dirs([corpus.join("mod")]);
    let parser = ScriptParser::new(config);
    let found = parser.files("p/*.txt").unwrap();
    let found: Vec<_> = found.iter().map(|p| rel(&corpus, p)).collect();
    assert_eq!(found, ["mod/p/x.txt"]);
}

#[test]
fn cached_parse_survives_runs_and_sees_uncommitted_edits() {
    let corpus = Corpus::new();
    let cache = tempfile::tempdir().unwrap();
    corpus.git_init();
    corpus.write("base/common/titles.txt", "# header\ne_test = { color = { 1 2 3 } }\n");
    corpus.commit_all("initial");

    let first = {
        let mut parser = new_parser(&corpus, &cache);
        let tree = parser.parse_file("common/titles.txt").unwrap();
        assert_eq!(parser.stats().misses, 1);
        tree
    };

    let mut parser = new_parser(&corpus, &cache);
    let second = parser.parse_file("common/titles.txt").unwrap();
    assert_eq!(second, first);
    assert_eq!(parser.stats().hits, 1);
    assert_eq!(parser.stats().misses, 0);
    drop(parser);

    corpus.write("base/common/titles.txt", "e_test = { color = { 4 5 6 } }\n");
    let mut parser = new_parser(&corpus, &cache);
    let edited = parser.parse_file("common/titles.txt").unwrap();
    assert_ne!(edited, first);
    let color = edited
        .get("e_test")
        .and_then(Value::as_object)
        .and_then(|o| o.get("color"))
        .and_then(Value::as_object)
        .unwrap();
    assert_eq!(color.items()[0].value().as_i64(), Some(4));
    assert_eq!(parser.stats().misses, 1);
}

#[test]
fn ignore_cache_and_replace_policy_never_touch_the_cache() {
    let (corpus, cache) = setup();
    let path = corpus.write("base/a.txt", "a = 1");

    let mut parser = ScriptParser::new(config(&corpus, &cache).ignore_cache(true));
    parser.parse_file(&path).unwrap();
    assert_eq!(parser.stats().misses, 0);
    drop(parser);

    let mut parser = ScriptParser::new(config(&corpus, &cache));
    parser
        .parse_file_with(&path, FileOptions::default().decode(DecodePolicy::Replace))
        .unwrap();
    assert_eq!(parser.stats().misses, 0);
    assert!(!cache.path().exists() || fs::read_dir(cache.path()).unwrap().count() == 0);
}

#[test]
fn memory_cache_skips_disk() {
    let (corpus, cache) = setup();
    let path = corpus.write("base/a.txt", "a = 1");
    let mut parser = ScriptParser::new(config(&corpus, &cache).memory_cache(true).disk_cache(false));
    parser.parse_file(&path).unwrap();
    parser.parse_file(&path).unwrap();
    assert_eq!(parser.stats().hits, 1);
    parser.cache().flush();
    parser.parse_file(&path).unwrap();
    assert_eq!(parser.stats().misses, 2);
}

#[test]
fn merge_parse_later_file_wins() {
    let (corpus, cache) = setup();
    corpus.write("base/common/00_a.txt", "a = 1\nb = 1\n");
    corpus.write("base/common/01_b.txt", "a = 2\nc = 3\n");

    let mut parser = new_parser(&corpus, &cache);
    let merged = parser.merge_parse("common/*.txt").unwrap();
    let keys: Vec<_> = merged.keys().map(ToString::to_string).collect();
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(merged[&Key::from("a")].as_i64(), Some(2));
}

#[test]
fn merge_parse_in_other_layers() {
    let (corpus, cache) = setup();
    corpus.write("base/common/a.txt", "a = 1\n");
    corpus.write("vanilla/common/a.txt", "a = 10\nb = 1\n");
    corpus.write("mod/common/a.txt", "a = 20\n");
    corpus.write("mod/common/b.txt", "c = 3\n");

    let mut parser = new_parser(&corpus, &cache);
    let layers = Layers::new(corpus.join("vanilla")).with_overrides([corpus.join("mod")]);
    let merged = parser.merge_parse_in("common/*.txt", &layers).unwrap();
    let keys: Vec<_> = merged.keys().map(ToString::to_string).collect();
    assert_eq!(keys, ["a", "c"]);
    assert_eq!(merged[&Key::from("a")].as_i64(), Some(20));
}

#[test]
fn later_override_wins() {
    let (corpus, cache) = setup();
    corpus.write("base/common/a.txt", "a = base\n");
    corpus.write("first/common/a.txt", "a = first\n");
    corpus.write("last/common/a.txt", "a = last\n");

    let config = config(&corpus, &cache).override_dirs([corpus.join("first"), corpus.join("last")]);
    let mut parser = ScriptParser::new(config);
    let tree = parser.parse_file("common/a.txt").unwrap();
    assert_eq!(tree.get("a").and_then(Value::as_str), Some("last"));
}

#[test]
fn parse_files_skips_directories() {
    let (corpus, cache) = setup();
    corpus.write("base/history/a.txt", "a = 1");
    corpus.mkdir("base/history/dir.txt");
    corpus.write("base/history/b.txt", "b = 2");

    let mut parser = new_parser(&corpus, &cache);
    let parsed: Vec<_> = parser
        .parse_files("history/*.txt")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<_> = parsed.iter().map(|(p, _)| rel(&corpus, p)).collect();
    assert_eq!(names, ["base/history/a.txt", "base/history/b.txt"]);
    assert!(parsed.iter().all(|(p, _)| p.is_absolute()));
    assert!(parsed[1].1.contains_key("b"));
}

#[test]
fn relative_path_not_found() {
    let (corpus, cache) = setup();
    let mut parser = new_parser(&corpus, &cache);
    let err = parser.parse_file("common/missing.txt").unwrap_err();
    assert!(matches!(err, Error::NotFound(ref glob) if glob == "common/missing.txt"));
}

#[test]
fn syntax_errors_carry_path_and_render() {
    let (corpus, cache) = setup();
    let bad_lex = corpus.write("base/lex.txt", "a = \"open\n");
    let bad_parse = corpus.write("base/parse.txt", "a = {\n\tb = c\n");
    let mut parser = new_parser(&corpus, &cache);

    let err = parser.parse_file(&bad_lex).unwrap_err();
    assert!(matches!(err, Error::Lex { .. }), "{err:?}");
    assert!(err.path().unwrap().ends_with("lex.txt"));

    let err = parser.parse_file(&bad_parse).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    assert!(err.to_string().contains("unclosed object at offset 4"));
    let rendered = err.render().unwrap();
    let rendered = String::from_utf8(strip_ansi_escapes::strip(rendered)).unwrap();
    assert!(rendered.contains("parse.txt"), "{rendered}");
    assert!(rendered.contains("object opened here"), "{rendered}");
}

#[test]
fn lenient_parser_closes_objects() {
    let (corpus, cache) = setup();
    let path = corpus.write("base/parse.txt", "a = {\n\tb = c\n");
    let mut parser = ScriptParser::new(config(&corpus, &cache).strict(false));
    let tree = parser.parse_file(&path).unwrap();
    assert!(tree.get("a").unwrap().is_object());
}

#[test]
fn strict_decoding_rejects_malformed_input() {
    let (corpus, cache) = setup();
    let path = corpus.join("base/a.txt");
    fs::write(&path, b"a = \xff\n").unwrap();

    let mut parser = ScriptParser::new(config(&corpus, &cache).encoding(UTF_8));
    let err = parser.parse_file(&path).unwrap_err();
    assert!(matches!(err, Error::Decode { encoding: "UTF-8", .. }), "{err:?}");

    let tree = parser
        .parse_file_with(&path, FileOptions::default().decode(DecodePolicy::Replace))
        .unwrap();
    assert_eq!(tree.get("a").and_then(Value::as_str), Some("\u{fffd}"));
}

#[test]
fn write_encodes_and_creates_directories() {
    let (corpus, cache) = setup();
    let parser = new_parser(&corpus, &cache);
    let mut tree = TopLevel::new(vec![Pair::new("name", "Français"), Pair::new("size", 3i64)]);
    tree.set_header_comment("-*- coding: windows-1252 -*-");

    let out = corpus.join("out/common/names.txt");
    parser.write(&tree, &out).unwrap();
    let bytes = fs::read(&out).unwrap();
    assert_eq!(
        bytes,
        b"# -*- coding: windows-1252 -*-\r\n\r\nname = Fran\xe7ais\r\nsize = 3\r\n"
    );

    let mut reader = ScriptParser::new(config(&corpus, &cache).ignore_cache(true));
    assert_eq!(reader.parse_file(&out).unwrap(), tree);
}

#[test]
fn crlf_multiline_string_round_trips() {
    let (corpus, cache) = setup();
    let path = corpus.join("base/a.txt");
    let source = b"a = \"x\r\ny\"\r\nb = 1\r\n";
    fs::write(&path, source).unwrap();

    let mut parser = new_parser(&corpus, &cache);
    for _ in 0..2 {
        let tree = parser.parse_file(&path).unwrap();
        assert_eq!(tree.get("a").and_then(Value::as_str), Some("x\ny"));
        parser.write(&tree, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), source);
    }
}

#[test]
fn memory_cache_is_per_encoding() {
    let (corpus, cache) = setup();
    let path = corpus.join("base/a.txt");
    fs::write(&path, "a = \"Fran\u{e7}ais\"\n").unwrap();

    let mut parser = ScriptParser::new(config(&corpus, &cache).memory_cache(true).disk_cache(false));
    let cp1252 = parser.parse_file(&path).unwrap();
    let utf8 = parser
        .parse_file_with(&path, FileOptions::default().encoding(UTF_8))
        .unwrap();
    assert_eq!(cp1252.get("a").and_then(Value::as_str), Some("Fran\u{c3}\u{a7}ais"));
    assert_eq!(utf8.get("a").and_then(Value::as_str), Some("Fran\u{e7}ais"));
    assert_eq!(parser.stats().misses, 2);
}

#[test]
fn write_with_lf_and_simple_profile() {
    let (corpus, cache) = setup();
    let parser = ScriptParser::new(
        config(&corpus, &cache)
            .profile(Profile::Simple)
            .line_ending(LineEnding::Lf),
    );
    let tree = parser.parse("# dropped\na={b=1}").unwrap();
    let out = corpus.join("out.txt");
    parser.write(&tree, &out).unwrap();
    insta::assert_snapshot!(fs::read_to_string(&out).unwrap(), @"a = { b = 1 }");
}

#[test]
fn write_rejects_unencodable_text() {
    let (corpus, cache) = setup();
    let parser = new_parser(&corpus, &cache);
    let tree = TopLevel::new(vec![Pair::new("name", "\u{4e2d}")]);
    let out = corpus.join("out.txt");
    let err = parser.write(&tree, &out).unwrap_err();
    assert!(matches!(err, Error::Encode { .. }));
    assert!(!out.exists());
}
