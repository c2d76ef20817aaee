use std::fs;
use std::path::{Path, PathBuf};

use resfilter::codec::{merge_file, parse_file};
use resfilter::wrap::MAX_LINE_WIDTH;
use resfilter::{
    AndroidStrings, FilterOptions, FormatType, LanguageBundle, LanguageBundleBuilder,
    ResourceFilter,
};

const ABOUT_FR: &str = "Notes garde toutes vos idées au même endroit. Notez-les, retrouvez-les \
                        et partagez-les avec les personnes avec qui vous travaillez chaque jour.";

fn data_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn android_fixture() -> PathBuf {
    data_root()
        .join("res")
        .join("values-en")
        .join("strings.xml")
}

fn french_bundle() -> LanguageBundle {
    let mut builder = LanguageBundleBuilder::new();
    builder.embedded_language_code("fr");
    builder.add("greeting", "Bonjour").unwrap();
    builder.add("about", ABOUT_FR).unwrap();
    builder
        .add("weekdays", "[Lundi, Mardi, Mercredi]")
        .unwrap();
    builder
        .add(
            "notes_count",
            "{notes_count, plural, {one{%d note} other{%d notes (fr)}}}",
        )
        .unwrap();
    builder.add("not_in_base", "Ignoré").unwrap();
    builder.build()
}

fn merge_fixture() -> String {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("strings.xml");
    merge_file(
        android_fixture(),
        &output,
        None,
        &french_bundle(),
        &FilterOptions::for_language_tag("fr").unwrap(),
    )
    .unwrap();
    fs::read_to_string(output).unwrap()
}

#[test]
fn parse_fixture_flattens_every_element() {
    let bundle = parse_file(android_fixture(), None, &FilterOptions::new()).unwrap();
    assert_eq!(bundle.embedded_language_code(), Some("en"));

    let keys: Vec<&str> = bundle
        .resource_strings()
        .iter()
        .map(|rs| rs.key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec![
            "app_name",
            "greeting",
            "about",
            "weekdays",
            "notes_count",
            "untranslated"
        ]
    );

    let weekdays = bundle.find("weekdays").unwrap();
    assert_eq!(weekdays.value, "[Monday, Tuesday, Wednesday]");
    assert_eq!(weekdays.sequence_number, 4);

    let plurals = bundle.find("notes_count").unwrap();
    assert_eq!(
        plurals.value,
        "{notes_count, plural, {one{%d note} other{%d notes}}}"
    );
    assert_eq!(plurals.notes, vec![" Shown in the toolbar ".to_string()]);
}

#[test]
fn merge_keeps_untranslated_lines_verbatim() {
    let original = fs::read_to_string(android_fixture()).unwrap();
    let merged = merge_fixture();

    for line in [
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>",
        "<!-- Copyright notice that must survive a merge. -->",
        "<resources xmlns:tools=\"http://schemas.android.com/tools\">",
        "    <!-- Main screen -->",
        "    <string name=\"app_name\" translatable=\"false\">Notes</string>",
        "    <string name=\"untranslated\">Keep me</string>",
        "</resources>",
    ] {
        assert!(original.lines().any(|l| l == line), "fixture changed: {}", line);
        assert!(merged.lines().any(|l| l == line), "lost line: {}", line);
    }
    assert!(!merged.contains("not_in_base"));
    assert!(!merged.contains("Hello"));
    assert!(!merged.contains("Monday"));
}

#[test]
fn merge_replaces_translated_elements() {
    let merged = merge_fixture();

    assert!(merged.contains("    <string name=\"greeting\">Bonjour</string>\n"));
    assert!(merged.contains(
        "    <string-array name=\"weekdays\">\n\
         \x20       <item>Lundi</item>\n\
         \x20       <item>Mardi</item>\n\
         \x20       <item>Mercredi</item>\n\
         \x20   </string-array>\n"
    ));
    // Comments inside a replaced plurals element are not carried over.
    assert!(merged.contains(
        "    <plurals name=\"notes_count\">\n\
         \x20       <item quantity=\"one\">%d note</item>\n\
         \x20       <item quantity=\"other\">%d notes (fr)</item>\n\
         \x20   </plurals>\n"
    ));
    assert!(!merged.contains("Shown in the toolbar"));
}

#[test]
fn merge_wraps_long_messages_at_word_boundaries() {
    let merged = merge_fixture();
    let lines: Vec<&str> = merged.lines().collect();

    let open = lines
        .iter()
        .position(|l| *l == "    <string name=\"about\">")
        .expect("wrapped opening tag on its own line");
    let close = open
        + lines[open..]
            .iter()
            .position(|l| *l == "    </string>")
            .expect("closing tag on its own line");
    assert!(close - open > 2);

    let body: String = lines[open + 1..close]
        .iter()
        .map(|l| l.strip_prefix("        ").expect("continuation indent"))
        .collect();
    assert_eq!(body, ABOUT_FR);

    for line in &lines {
        assert!(line.chars().count() <= MAX_LINE_WIDTH, "too wide: {:?}", line);
    }
}

#[test]
fn merged_output_parses_with_new_values() {
    let merged = merge_fixture();
    let bundle = AndroidStrings
        .parse_str(&merged, &FilterOptions::new())
        .unwrap();

    assert_eq!(bundle.find("greeting").unwrap().value, "Bonjour");
    assert_eq!(
        bundle.find("weekdays").unwrap().value,
        "[Lundi, Mardi, Mercredi]"
    );
    assert_eq!(
        bundle.find("notes_count").unwrap().value,
        "{notes_count, plural, {one{%d note} other{%d notes (fr)}}}"
    );
    assert_eq!(bundle.find("untranslated").unwrap().value, "Keep me");
}

#[test]
fn merge_with_empty_bundle_copies_base() {
    let original = fs::read_to_string(android_fixture()).unwrap();
    let merged = AndroidStrings
        .merge_str(&original, &LanguageBundle::default(), &FilterOptions::new())
        .unwrap();
    assert_eq!(merged, original);
}

#[test]
fn merge_with_explicit_format_ignores_extension() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().join("strings.txt");
    let output = tmp.path().join("merged.txt");
    fs::write(
        &base,
        "<resources>\n    <string name=\"greeting\">Hello</string>\n</resources>\n",
    )
    .unwrap();

    merge_file(
        &base,
        &output,
        Some(FormatType::AndroidStrings),
        &french_bundle(),
        &FilterOptions::new(),
    )
    .unwrap();
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "<resources>\n    <string name=\"greeting\">Bonjour</string>\n</resources>\n"
    );
}
