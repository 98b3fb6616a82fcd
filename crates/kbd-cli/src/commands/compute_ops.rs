use std::path::Path;
use std::process;
use std::sync::Arc;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use kbd_core::popup::KeyHintConfiguration;
use kbd_core::prefs::Prefs;
use kbd_core::resources::KeyboardResources;
use kbd_core::state::{InputShiftState, KeyVariation};
use kbd_core::{ComponentName, ComputedKey, ComputedKeyboard, KeyType, KeyboardMode, Subtype};
use kbd_session::{KeyboardManager, LayerRequest, RenderInfo};

use super::open_store;
use super::prefs_ops::load_prefs;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// What to compute and how to print it.
pub struct ComputeRequest<'a> {
    pub path: &'a str,
    pub mode: KeyboardMode,
    /// Language tag of a subtype preset from the index.
    pub preset: Option<&'a str>,
    /// Characters layout override, as `extension:component`.
    pub characters: Option<&'a str>,
    pub prefs_file: Option<&'a str>,
    pub shift: InputShiftState,
    pub variation: KeyVariation,
    pub json: bool,
}

#[derive(Serialize)]
struct KeyView<'a> {
    code: i32,
    key_type: KeyType,
    label: Option<&'a str>,
    hinted_label: Option<&'a str>,
    icon: Option<&'static str>,
    enabled: bool,
    width_factor: f32,
    popups: Vec<String>,
}

#[derive(Serialize)]
struct KeyboardView<'a> {
    version: u64,
    mode: KeyboardMode,
    subtype: String,
    rows: Vec<Vec<KeyView<'a>>>,
}

fn resolve_subtype(resources: &KeyboardResources, preset: Option<&str>, characters: Option<&str>) -> Subtype {
    let mut subtype = match preset {
        Some(tag) => match resources
            .subtype_presets()
            .iter()
            .find(|p| p.language_tag.eq_ignore_ascii_case(tag))
        {
            Some(p) => p.to_subtype(0),
            None => {
                eprintln!("Error: no subtype preset for '{tag}'");
                process::exit(1);
            }
        },
        None => Subtype::default_subtype(),
    };
    if let Some(name) = characters {
        subtype.layout_map.characters = die!(name.parse::<ComponentName>(), "Error: {}");
    }
    subtype
}

pub fn compute(req: &ComputeRequest) {
    let store = die!(open_store(Path::new(req.path)), "Error opening {}: {}", req.path);
    let resources = store.resources();
    let subtype = resolve_subtype(&resources, req.preset, req.characters);
    let prefs = req.prefs_file.map(load_prefs).unwrap_or_default();
    let hints = prefs.key_hint_configuration();

    let runtime = die!(
        tokio::runtime::Builder::new_current_thread().enable_all().build(),
        "Error starting runtime: {}"
    );
    let info = runtime.block_on(async {
        let manager = KeyboardManager::new(
            tokio::runtime::Handle::current(),
            Arc::new(resources),
            Arc::new(store),
            prefs.clone(),
        );
        manager.set_active_subtype(subtype.clone()).await;
        manager.state().batch_edit(|s| {
            s.set_keyboard_mode(req.mode);
            s.set_key_variation(req.variation);
            s.set_input_shift_state(req.shift);
        });
        report_layer_failures(&manager, req.mode, &subtype, &prefs).await;
        manager.refresh().await
    });

    if req.json {
        print_json(&info, &subtype, &hints);
    } else {
        print_grid(&info, &subtype);
    }
}

async fn report_layer_failures(manager: &KeyboardManager, mode: KeyboardMode, subtype: &Subtype, prefs: &Prefs) {
    let layouts = manager.layouts();
    let Some(request) = LayerRequest::for_mode(mode, subtype, prefs) else {
        return;
    };
    let main = match &request.main {
        Some(ltn) => Some(layouts.load_layout(ltn).await),
        None => None,
    };
    let modifier = request.modifier_for(main.as_ref());
    if let (Some(ltn), Some(Err(e))) = (&request.main, &main) {
        eprintln!("Warning: {ltn}: {e}");
    }
    for ltn in [modifier, request.extension].into_iter().flatten() {
        if let Err(e) = layouts.load_layout(&ltn).await {
            eprintln!("Warning: {ltn}: {e}");
        }
    }
}

fn cell_text(key: &ComputedKey) -> String {
    let mut text = key
        .label
        .clone()
        .or_else(|| key.icon.map(|i| format!("<{}>", i.name())))
        .unwrap_or_else(|| format!("#{}", key.computed.code));
    if let Some(hint) = &key.hinted_label {
        text.push('^');
        text.push_str(hint);
    }
    if !key.is_enabled {
        text = format!("({text})");
    }
    text
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

fn print_grid(info: &RenderInfo, subtype: &Subtype) {
    let keyboard: &ComputedKeyboard = &info.keyboard;
    println!(
        "mode={:?} version={} subtype={}",
        keyboard.mode,
        info.version,
        subtype.short_label()
    );
    if keyboard.rows.is_empty() {
        println!("(no keys)");
        return;
    }

    let rows: Vec<Vec<String>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().filter(|k| k.is_visible).map(cell_text).collect())
        .collect();
    let width = rows
        .iter()
        .flatten()
        .map(|c| c.width())
        .max()
        .unwrap_or(1);
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| pad(c, width)).collect();
        println!("| {} |", cells.join(" | "));
    }
}

fn print_json(info: &RenderInfo, subtype: &Subtype, hints: &KeyHintConfiguration) {
    let view = KeyboardView {
        version: info.version,
        mode: info.keyboard.mode,
        subtype: subtype.short_label(),
        rows: info
            .keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|k| k.is_visible)
                    .map(|k| KeyView {
                        code: k.computed.code,
                        key_type: k.computed.key_type,
                        label: k.label.as_deref(),
                        hinted_label: k.hinted_label.as_deref(),
                        icon: k.icon.map(|i| i.name()),
                        enabled: k.is_enabled,
                        width_factor: k.width_factor,
                        popups: k
                            .popups
                            .popup_keys(hints)
                            .iter()
                            .map(|p| p.label.clone())
                            .collect(),
                    })
                    .collect()
            })
            .collect(),
    };
    println!(
        "{}",
        die!(serde_json::to_string_pretty(&view), "Error encoding JSON: {}")
    );
}
