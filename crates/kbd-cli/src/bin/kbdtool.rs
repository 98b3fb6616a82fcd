use clap::{Parser, Subcommand, ValueEnum};

use kbd_cli::commands::compute_ops::{self, ComputeRequest};
use kbd_cli::commands::{index_ops, prefs_ops};
use kbd_core::state::{InputShiftState, KeyVariation};
use kbd_core::KeyboardMode;

#[derive(Parser)]
#[command(name = "kbdtool", about = "Keyboard layout diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Characters,
    Editing,
    Symbols,
    Symbols2,
    Numeric,
    NumericAdvanced,
    Phone,
    Phone2,
    SmartbarClipboard,
    SmartbarNumberRow,
}

impl From<ModeArg> for KeyboardMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Characters => KeyboardMode::Characters,
            ModeArg::Editing => KeyboardMode::Editing,
            ModeArg::Symbols => KeyboardMode::Symbols,
            ModeArg::Symbols2 => KeyboardMode::Symbols2,
            ModeArg::Numeric => KeyboardMode::Numeric,
            ModeArg::NumericAdvanced => KeyboardMode::NumericAdvanced,
            ModeArg::Phone => KeyboardMode::Phone,
            ModeArg::Phone2 => KeyboardMode::Phone2,
            ModeArg::SmartbarClipboard => KeyboardMode::SmartbarClipboardCursorRow,
            ModeArg::SmartbarNumberRow => KeyboardMode::SmartbarNumberRow,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum VariationArg {
    All,
    Normal,
    Email,
    Password,
    Uri,
}

impl From<VariationArg> for KeyVariation {
    fn from(variation: VariationArg) -> Self {
        match variation {
            VariationArg::All => KeyVariation::All,
            VariationArg::Normal => KeyVariation::Normal,
            VariationArg::Email => KeyVariation::EmailAddress,
            VariationArg::Password => KeyVariation::Password,
            VariationArg::Uri => KeyVariation::Uri,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the extensions, layouts and presets found at a path
    Index {
        /// Extension directory, archive, or a directory of extensions
        path: String,
    },
    /// Compute a keyboard and print it as a grid or JSON
    Compute {
        /// Extension directory, archive, or a directory of extensions
        path: String,
        /// Keyboard mode
        #[arg(long, value_enum, default_value = "characters")]
        mode: ModeArg,
        /// Subtype preset language tag (default: built-in en-US subtype)
        #[arg(long)]
        preset: Option<String>,
        /// Characters layout override (extension:component)
        #[arg(long)]
        characters: Option<String>,
        /// Preferences TOML file (default: built-in defaults)
        #[arg(long)]
        prefs: Option<String>,
        /// Key variation
        #[arg(long, value_enum, default_value = "all")]
        variation: VariationArg,
        /// Resolve with shift pressed
        #[arg(long, conflicts_with = "caps")]
        shift: bool,
        /// Resolve with caps lock on
        #[arg(long)]
        caps: bool,
        /// Output as JSON instead of a text grid
        #[arg(long)]
        json: bool,
    },
    /// Export default preferences as TOML
    PrefsExport,
    /// Validate a preferences TOML file
    PrefsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Index { path } => index_ops::index(&path),
        Command::Compute {
            path,
            mode,
            preset,
            characters,
            prefs,
            variation,
            shift,
            caps,
            json,
        } => {
            let shift = if caps {
                InputShiftState::CapsLock
            } else if shift {
                InputShiftState::ShiftedManual
            } else {
                InputShiftState::Unshifted
            };
            compute_ops::compute(&ComputeRequest {
                path: &path,
                mode: mode.into(),
                preset: preset.as_deref(),
                characters: characters.as_deref(),
                prefs_file: prefs.as_deref(),
                shift,
                variation: variation.into(),
                json,
            });
        }
        Command::PrefsExport => prefs_ops::prefs_export(),
        Command::PrefsValidate { file } => prefs_ops::prefs_validate(&file),
    }
}
