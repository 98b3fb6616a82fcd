use std::io::Write;
use std::sync::Arc;

use super::*;
use crate::layout::LayoutType;
use crate::subtype::{ext_core_currency_set, ext_core_layout, ext_core_popup_mapping};

const MANIFEST: &str = r#"{
    "meta": { "id": "org.kbd.layouts", "version": "0.1.0", "title": "Layouts" },
    "layouts": {
        "characters": [
            { "id": "qwerty", "label": "QWERTY" },
            { "id": "azerty", "label": "AZERTY", "modifier": "org.kbd.layouts:azerty_mod" }
        ],
        "characters/mod": [ { "id": "default" } ],
        "hovercraft": [ { "id": "eels" } ]
    },
    "popupMappings": [ { "id": "default" }, { "id": "fr", "mappingFile": "popup/french.json" } ],
    "currencySets": [
        { "id": "euro", "label": "Euro", "slots": [
            { "code": 8364, "label": "€" }, { "code": 162, "label": "¢" }
        ] }
    ],
    "subtypePresets": [ { "languageTag": "fr-FR", "currencySet": "org.kbd.layouts:euro" } ]
}"#;

fn manifest() -> KeyboardExtension {
    KeyboardExtension::from_json(MANIFEST.as_bytes()).unwrap()
}

#[test]
fn manifest_indexes_known_layout_types() {
    let res = KeyboardResources::from_extensions([&manifest()]);
    let qwerty = res.layout(LayoutType::Characters, &ext_core_layout("qwerty")).unwrap();
    assert_eq!(qwerty.label, "QWERTY");
    assert_eq!(
        qwerty.arrangement_file(LayoutType::Characters),
        "layouts/characters/qwerty.json"
    );
    let azerty = res.layout(LayoutType::Characters, &ext_core_layout("azerty")).unwrap();
    assert_eq!(azerty.modifier, Some(ext_core_layout("azerty_mod")));
    assert!(res.layout(LayoutType::Symbols, &ext_core_layout("qwerty")).is_none());
    assert_eq!(res.layouts_of(LayoutType::CharactersMod).len(), 1);
    assert_eq!(res.subtype_presets().len(), 1);
}

#[test]
fn popup_mapping_file_defaults_to_id() {
    let res = KeyboardResources::from_extensions([&manifest()]);
    let default = res
        .popup_mapping(&ComponentName::new("org.kbd.layouts", "default"))
        .unwrap();
    assert_eq!(default.mapping_file(), "popup/default.json");
    let fr = res
        .popup_mapping(&ComponentName::new("org.kbd.layouts", "fr"))
        .unwrap();
    assert_eq!(fr.mapping_file(), "popup/french.json");
    assert!(res.popup_mapping(&ext_core_popup_mapping("default")).is_none());
}

#[test]
fn currency_set_slots() {
    let res = KeyboardResources::from_extensions([&manifest()]);
    let set = res
        .currency_set(&ComponentName::new("org.kbd.layouts", "euro"))
        .unwrap();
    assert_eq!(set.slot(0).map(|k| k.label.as_str()), Some("€"));
    assert_eq!(set.slot(5), None);
    assert!(res.currency_set(&ext_core_currency_set("euro")).is_none());
}

#[test]
fn later_extension_wins() {
    let mut other = manifest();
    other.layouts.get_mut("characters").unwrap()[0].label = "Replaced".into();
    let res = KeyboardResources::from_extensions([&manifest(), &other]);
    let qwerty = res.layout(LayoutType::Characters, &ext_core_layout("qwerty")).unwrap();
    assert_eq!(qwerty.label, "Replaced");
}

#[test]
fn memory_package_and_store() {
    let package = MemoryPackage::new()
        .with_file(MANIFEST_FILE, MANIFEST)
        .with_file("layouts/characters/qwerty.json", "[[]]");
    let mut store = ExtensionStore::new();
    let ext = store.insert(Arc::new(package)).unwrap();
    assert_eq!(ext.meta.id, "org.kbd.layouts");
    let pkg = store.package("org.kbd.layouts").unwrap();
    assert_eq!(pkg.read_to_string("layouts/characters/qwerty.json").unwrap(), "[[]]");
    assert!(matches!(pkg.read("missing.json"), Err(ResourceError::NotFound(_))));
    assert!(store.package("org.kbd.other").is_none());
}

#[test]
fn dir_package_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(MANIFEST_FILE), MANIFEST).unwrap();
    let pkg = DirPackage::new(dir.path());
    assert!(pkg.read(MANIFEST_FILE).is_ok());
    assert!(matches!(pkg.read("../etc/passwd"), Err(ResourceError::InvalidPath(_))));
    assert!(matches!(pkg.read("/etc/passwd"), Err(ResourceError::InvalidPath(_))));
    assert!(matches!(pkg.read("nope.json"), Err(ResourceError::NotFound(_))));
}

fn write_zip(path: &std::path::Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn open_dir_finds_directories_and_archives() {
    let root = tempfile::tempdir().unwrap();

    let unpacked = root.path().join("layouts");
    std::fs::create_dir(&unpacked).unwrap();
    std::fs::write(unpacked.join(MANIFEST_FILE), MANIFEST).unwrap();

    let archive_manifest = r#"{ "meta": { "id": "org.example.extra" } }"#;
    write_zip(
        &root.path().join("extra.flex"),
        &[(MANIFEST_FILE, archive_manifest), ("popup/default.json", "{}")],
    );
    std::fs::write(root.path().join("notes.txt"), "ignored").unwrap();
    std::fs::create_dir(root.path().join("empty")).unwrap();

    let store = ExtensionStore::open_dir(root.path()).unwrap();
    let mut ids = store.extension_ids();
    ids.sort();
    assert_eq!(ids, vec!["org.example.extra", "org.kbd.layouts"]);

    let zipped = store.package("org.example.extra").unwrap();
    assert_eq!(zipped.read_to_string("popup/default.json").unwrap(), "{}");
    assert!(matches!(zipped.read("popup/en.json"), Err(ResourceError::NotFound(_))));
}

#[test]
fn broken_archive_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("broken.zip"), b"not a zip").unwrap();
    let store = ExtensionStore::open_dir(root.path()).unwrap();
    assert!(store.extensions().is_empty());
}
