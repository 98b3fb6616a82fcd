//! Merging of extension, main and modifier layers into one key grid.
//!
//! ```text
//!   e e e e e e e e e e      e = extension
//!   c c c c c c c c c c      c = main
//!    c c c c c c c c c       m = modifier
//!   m c c c c c c c c m
//!   m m m m m m m m m m
//! ```

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::evaluator::DefaultComputingEvaluator;
use crate::key::KeyType;

use super::{LayoutArrangement, TextKey};

fn to_row(keys: &[Arc<crate::key::AbstractKeyData>]) -> Vec<TextKey> {
    keys.iter().map(|k| TextKey::new(Arc::clone(k))).collect()
}

/// Stack the layers. The last main row is spliced into the first modifier
/// row at every placeholder.
pub fn merge_arrangements(
    main: Option<&LayoutArrangement>,
    modifier: Option<&LayoutArrangement>,
    extension: Option<&LayoutArrangement>,
) -> Vec<Vec<TextKey>> {
    let _span = debug_span!(
        "merge_layouts",
        main = main.is_some(),
        modifier = modifier.is_some(),
        extension = extension.is_some()
    )
    .entered();

    let mut rows: Vec<Vec<TextKey>> = Vec::new();

    if let Some(ext) = extension {
        rows.extend(ext.rows.iter().map(|r| to_row(r)));
    }

    match (main, modifier) {
        (Some(main), Some(modifier)) => {
            if let Some((last, head)) = main.rows.split_last() {
                rows.extend(head.iter().map(|r| to_row(r)));
                let mut fused = Vec::new();
                for key in modifier.rows.first().into_iter().flatten() {
                    if key.is_placeholder() {
                        fused.extend(to_row(last));
                    } else {
                        fused.push(TextKey::new(Arc::clone(key)));
                    }
                }
                rows.push(fused);
            }
            rows.extend(modifier.rows.iter().skip(1).map(|r| to_row(r)));
        }
        (Some(only), None) | (None, Some(only)) => {
            rows.extend(only.rows.iter().map(|r| to_row(r)));
        }
        (None, None) => {}
    }

    debug!(rows = rows.len(), "merged arrangement");
    rows
}

/// Attach `hint_row[k]` to `row[k]` when it resolves to a key of `hint_type`
/// under the neutral evaluator.
pub fn add_row_hints(row: &mut [TextKey], hint_row: &[TextKey], hint_type: KeyType) {
    for (k, key) in row.iter_mut().enumerate() {
        let Some(hint) = hint_row
            .get(k)
            .and_then(|h| h.data.compute(&DefaultComputingEvaluator))
        else {
            continue;
        };
        if hint.key_type != hint_type {
            continue;
        }
        match hint_type {
            KeyType::Character => key.symbol_hint = Some(hint),
            KeyType::Numeric => key.number_hint = Some(hint),
            _ => {}
        }
    }
}

/// Overlay hints from the symbols grid. Number hints come from its first row;
/// symbol hints are aligned bottom-up.
pub fn apply_hints(rows: &mut [Vec<TextKey>], symbols: &[Vec<TextKey>], number_row_hints: bool) {
    if rows.is_empty() {
        return;
    }
    if number_row_hints {
        if let Some(symbol_row) = symbols.first() {
            add_row_hints(&mut rows[0], symbol_row, KeyType::Numeric);
        }
    }
    let offset = rows.len() as isize - symbols.len() as isize;
    for (r, row) in rows.iter_mut().enumerate() {
        let idx = r as isize - offset;
        if idx < 0 {
            continue;
        }
        if let Some(symbol_row) = symbols.get(idx as usize) {
            add_row_hints(row, symbol_row, KeyType::Character);
        }
    }
}
