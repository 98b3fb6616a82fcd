
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kbd_core::layout::TextKey;
use kbd_core::prefs::Prefs;
use kbd_core::resources::{ExtensionStore, KeyboardResources, MemoryPackage, Package, MANIFEST_FILE};
use kbd_core::{ComputedKey, ResourceError};
use tokio::runtime::Handle;

use super::{KeyboardManager, LayoutManager};

const LAYOUTS_MANIFEST: &str = r#"{
    "meta": { "id": "org.kbd.layouts", "version": "0.1.0", "title": "Core layouts" },
    "layouts": {
        "characters": [
            { "id": "qwerty", "label": "QWERTY" },
            { "id": "azerty", "label": "AZERTY", "modifier": "org.kbd.layouts:azerty_mod" },
            { "id": "broken", "label": "Broken" },
            { "id": "broken_azerty", "label": "Broken AZERTY", "modifier": "org.kbd.layouts:azerty_mod" }
        ],
        "characters/mod": [ { "id": "default" }, { "id": "azerty_mod" } ],
        "symbols": [ { "id": "western" } ],
        "symbols/mod": [ { "id": "default" } ],
        "symbols2": [ { "id": "western" } ],
        "symbols2/mod": [ { "id": "default" } ],
        "numeric": [ { "id": "western_arabic" }, { "id": "pinpad", "modifier": "org.kbd.layouts:azerty_mod" } ],
        "numericAdvanced": [ { "id": "western_arabic" } ],
        "numericRow": [ { "id": "western_arabic" } ],
        "phone": [ { "id": "telpad" } ],
        "phone2": [ { "id": "telpad" } ],
        "extension": [ { "id": "clipboard_cursor_row" } ]
    }
}"#;

const LOCALIZATION_MANIFEST: &str = r#"{
    "meta": { "id": "org.kbd.localization", "version": "0.1.0" },
    "popupMappings": [ { "id": "en" }, { "id": "default" } ]
}"#;

const CURRENCY_MANIFEST: &str = r#"{
    "meta": { "id": "org.kbd.currencysets", "version": "0.1.0" },
    "currencySets": [
        { "id": "dollar", "label": "Dollar", "slots": [
            { "code": 36, "label": "$" }, { "code": 162, "label": "¢" }, { "code": 8364, "label": "€" },
            { "code": 163, "label": "£" }, { "code": 165, "label": "¥" }, { "code": 8369, "label": "₱" }
        ] }
    ]
}"#;

const LAYOUT_FILES: &[(&str, &str)] = &[
    (
        "layouts/characters/qwerty.json",
        r#"[
            [ { "$": "auto_text_key", "code": 113, "label": "q" }, { "$": "auto_text_key", "code": 119, "label": "w" },
              { "$": "auto_text_key", "code": 101, "label": "e" } ],
            [ { "code": 97, "label": "a" }, { "code": 115, "label": "s" }, { "code": 100, "label": "d" } ],
            [ { "code": 122, "label": "z" }, { "code": 120, "label": "x" }, { "code": 99, "label": "c" } ]
        ]"#,
    ),
    (
        "layouts/characters/azerty.json",
        r#"[
            [ { "code": 97, "label": "a" }, { "code": 122, "label": "z" }, { "code": 101, "label": "e" } ],
            [ { "code": 113, "label": "q" }, { "code": 115, "label": "s" }, { "code": 100, "label": "d" } ],
            [ { "code": 119, "label": "w" }, { "code": 120, "label": "x" }, { "code": 99, "label": "c" } ]
        ]"#,
    ),
    ("layouts/characters/broken.json", r#"[ [ { "code": "#),
    ("layouts/characters/broken_azerty.json", r#"[ [ { "code": "#),
    (
        "layouts/characters/mod/default.json",
        r#"[
            [ { "code": -11, "type": "modifier", "label": "shift" }, { "$": "placeholder" },
              { "code": -7, "type": "enter_editing", "label": "delete" } ],
            [ { "code": -202, "type": "system_gui", "label": "?123" },
              { "code": -227, "type": "system_gui", "label": "language_switch" },
              { "code": -212, "type": "system_gui", "label": "emojis" },
              { "code": 32, "label": "space" },
              { "code": 10, "type": "enter_editing", "label": "enter" } ]
        ]"#,
    ),
    (
        "layouts/characters/mod/azerty_mod.json",
        r#"[
            [ { "$": "placeholder" } ],
            [ { "code": 32, "label": "space" } ]
        ]"#,
    ),
    (
        "layouts/symbols/western.json",
        r##"[
            [ { "code": 64, "label": "@" }, { "code": 35, "label": "#" }, { "code": -801, "label": "$" } ],
            [ { "code": 38, "label": "&" }, { "code": 45, "label": "-" }, { "code": 43, "label": "+" } ],
            [ { "code": 42, "label": "*" }, { "code": 34, "label": "\"" }, { "code": 39, "label": "'" } ]
        ]"##,
    ),
    (
        "layouts/symbols/mod/default.json",
        r#"[
            [ { "$": "placeholder" }, { "code": -7, "type": "enter_editing", "label": "delete" } ],
            [ { "code": -201, "type": "system_gui", "label": "ABC" }, { "code": 32, "label": "space" } ]
        ]"#,
    ),
    (
        "layouts/symbols2/western.json",
        r#"[ [ { "code": 126, "label": "~" }, { "code": 96, "label": "`" }, { "code": 124, "label": "|" } ] ]"#,
    ),
    ("layouts/symbols2/mod/default.json", r#"[ [ { "$": "placeholder" } ] ]"#),
    (
        "layouts/numeric/western_arabic.json",
        r#"[
            [ { "code": 49, "type": "numeric", "label": "1" }, { "code": 50, "type": "numeric", "label": "2" } ],
            [ { "code": 51, "type": "numeric", "label": "3" }, { "code": 52, "type": "numeric", "label": "4" } ]
        ]"#,
    ),
    (
        "layouts/numeric/pinpad.json",
        r#"[ [ { "code": 49, "type": "numeric", "label": "1" }, { "code": 48, "type": "numeric", "label": "0" } ] ]"#,
    ),
    (
        "layouts/numericAdvanced/western_arabic.json",
        r#"[ [ { "code": 49, "type": "numeric", "label": "1" }, { "code": 43, "label": "+" } ] ]"#,
    ),
    (
        "layouts/numericRow/western_arabic.json",
        r#"[ [ { "code": 49, "type": "numeric", "label": "1" }, { "code": 50, "type": "numeric", "label": "2" },
              { "code": 51, "type": "numeric", "label": "3" } ] ]"#,
    ),
    (
        "layouts/phone/telpad.json",
        r#"[ [ { "code": 49, "type": "numeric", "label": "1" }, { "code": 50, "type": "numeric", "label": "2" } ] ]"#,
    ),
    (
        "layouts/phone2/telpad.json",
        r##"[ [ { "code": 42, "label": "*" }, { "code": 35, "label": "#" } ] ]"##,
    ),
    (
        "layouts/extension/clipboard_cursor_row.json",
        r#"[ [ { "code": -31, "type": "system_gui", "label": "copy" },
               { "code": -33, "type": "system_gui", "label": "paste" },
               { "code": -35, "type": "system_gui", "label": "select_all" } ] ]"#,
    ),
];

const POPUP_EN: &str = r#"{
    "all": { "e": { "main": { "code": 233, "label": "é" }, "relevant": [ { "code": 232, "label": "è" } ] } }
}"#;

const POPUP_DEFAULT: &str = r#"{
    "all": { "a": { "main": { "code": 225, "label": "á" } } }
}"#;

/// Read counts per asset path, manifests excluded.
#[derive(Default)]
pub(super) struct ReadLog(Mutex<HashMap<String, usize>>);

impl ReadLog {
    fn record(&self, path: &str) {
        *self.0.lock().unwrap().entry(path.to_string()).or_default() += 1;
    }

    pub(super) fn count(&self, path: &str) -> usize {
        self.0.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Memory package that logs every asset read and can stall it.
pub(super) struct CountingPackage {
    inner: MemoryPackage,
    reads: Arc<ReadLog>,
    delay: Duration,
}

impl Package for CountingPackage {
    fn read(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        if path != MANIFEST_FILE {
            self.reads.record(path);
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        self.inner.read(path)
    }
}

pub(super) struct Fixture {
    pub store: Arc<ExtensionStore>,
    pub index: Arc<KeyboardResources>,
    pub reads: Arc<ReadLog>,
}

impl Fixture {
    pub(super) fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub(super) fn with_delay(delay: Duration) -> Self {
        let reads = Arc::new(ReadLog::default());
        let counting = |inner: MemoryPackage| -> Arc<dyn Package> {
            Arc::new(CountingPackage {
                inner,
                reads: Arc::clone(&reads),
                delay,
            })
        };

        let mut layouts = MemoryPackage::new().with_file(MANIFEST_FILE, LAYOUTS_MANIFEST);
        for (path, contents) in LAYOUT_FILES {
            layouts.insert(*path, *contents);
        }
        let localization = MemoryPackage::new()
            .with_file(MANIFEST_FILE, LOCALIZATION_MANIFEST)
            .with_file("popup/en.json", POPUP_EN)
            .with_file("popup/default.json", POPUP_DEFAULT);
        let currency = MemoryPackage::new().with_file(MANIFEST_FILE, CURRENCY_MANIFEST);

        let mut store = ExtensionStore::new();
        store.insert(counting(layouts)).unwrap();
        store.insert(counting(localization)).unwrap();
        store.insert(counting(currency)).unwrap();
        let index = Arc::new(store.resources());
        Self {
            store: Arc::new(store),
            index,
            reads,
        }
    }

    pub(super) fn layouts(&self) -> LayoutManager {
        LayoutManager::new(self.index.clone(), self.store.clone())
    }

    /// Must be called inside a tokio runtime.
    pub(super) fn manager(&self) -> KeyboardManager {
        self.manager_with(Prefs::default())
    }

    pub(super) fn manager_with(&self, prefs: Prefs) -> KeyboardManager {
        KeyboardManager::new(Handle::current(), self.index.clone(), self.store.clone(), prefs)
    }
}

pub(super) fn text_labels(row: &[TextKey]) -> Vec<String> {
    row.iter()
        .map(|k| match k.data.as_ref() {
            kbd_core::AbstractKeyData::Text(d) | kbd_core::AbstractKeyData::AutoText(d) => d.label.clone(),
            other => format!("{other:?}"),
        })
        .collect()
}

pub(super) fn computed_labels(row: &[ComputedKey]) -> Vec<&str> {
    row.iter().map(|k| k.label.as_deref().unwrap_or("")).collect()
}
