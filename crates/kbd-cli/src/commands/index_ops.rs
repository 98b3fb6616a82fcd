use std::path::Path;
use std::process;

use kbd_core::LayoutType;

use super::open_store;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn index(path: &str) {
    let store = die!(open_store(Path::new(path)), "Error opening {path}: {}");
    if store.extensions().is_empty() {
        eprintln!("Error: no extensions found in {path}");
        process::exit(1);
    }

    println!("Extensions:");
    for ext in store.extensions() {
        let meta = &ext.meta;
        if meta.title.is_empty() {
            println!("  {} {}", meta.id, meta.version);
        } else {
            println!("  {} {} ({})", meta.id, meta.version, meta.title);
        }
    }

    let resources = store.resources();
    println!("\nLayouts:");
    for layout_type in LayoutType::ALL {
        let layouts = resources.layouts_of(layout_type);
        if layouts.is_empty() {
            continue;
        }
        println!("  {}:", layout_type.id());
        for (name, component) in layouts {
            let mut line = format!("    {name}");
            if !component.label.is_empty() {
                line.push_str(&format!("  \"{}\"", component.label));
            }
            if let Some(modifier) = &component.modifier {
                line.push_str(&format!("  modifier={modifier}"));
            }
            println!("{line}");
        }
    }

    let mappings = resources.popup_mapping_names();
    if !mappings.is_empty() {
        println!("\nPopup mappings:");
        for name in mappings {
            println!("  {name}");
        }
    }

    let currency_sets = resources.currency_set_names();
    if !currency_sets.is_empty() {
        println!("\nCurrency sets:");
        for name in currency_sets {
            println!("  {name}");
        }
    }

    let presets = resources.subtype_presets();
    if !presets.is_empty() {
        println!("\nSubtype presets:");
        for preset in presets {
            println!(
                "  {}  characters={}  currency={}",
                preset.language_tag, preset.preferred.characters, preset.currency_set
            );
        }
    }
}
