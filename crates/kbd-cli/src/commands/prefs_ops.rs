use std::fs;
use std::process;

use kbd_core::prefs::{self, Prefs};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn prefs_export() {
    print!("{}", prefs::default_toml());
}

pub fn prefs_validate(file: &str) {
    let p = load_prefs(file);
    let kb = &p.keyboard;
    println!(
        "OK: keyboard.number_row={}, keyboard.utility_key_action={:?}, key_hint.symbol={:?}, key_hint.number={:?}, suggestion.enabled={}",
        kb.number_row,
        kb.utility_key_action,
        kb.key_hint.symbol_hint_mode,
        kb.key_hint.number_hint_mode,
        p.suggestion.enabled
    );
}

/// Parses a prefs file, exiting with a message on any error.
pub fn load_prefs(file: &str) -> Prefs {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(prefs::parse_prefs_toml(&content), "Error: {}")
}
