//! Sign color codes for wat servers.
//!
//! Players type `&` followed by a format code on a sign (`&4Warning`), and
//! this plugin rewrites it to the section-sign form the client renders
//! (`§4Warning`). `&&` escapes a literal ampersand.
//!
//! Install it on a registry with [`install`]; the handler replaces the
//! event's `lines` array with a translated copy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use wat_core::LifecycleError;
use wat_entity::{SignChangeEvent, StringArray};
use wat_event::Registry;
use wat_heap::{lifecycle, Shared, WatString};

/// Marker typed by players.
pub const ALT_CODE: char = '&';
/// Marker the client renders.
pub const SECTION_SIGN: char = '§';

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)&([0-9a-fk-or&])").expect("valid color code regex"));

/// Rewrite `&<code>` as `§<code>` for every color and format code.
///
/// Codes are `0-9`, `a-f`, `k-o` and `r`, in either case. `&&` becomes a
/// literal `&`, as does any `§&` already present. Text with nothing to
/// rewrite is returned borrowed.
pub fn translate_alternate_color_codes(line: &str) -> Cow<'_, str> {
    let replaced = CODE_RE.replace_all(line, "§$1");
    if replaced.contains("§&") {
        Cow::Owned(replaced.replace("§&", "&"))
    } else {
        replaced
    }
}

/// Translate every line into a new array.
///
/// Empty lines and lines that are not UTF-8 are copied unchanged.
pub fn translate_lines(lines: &StringArray) -> Result<StringArray, LifecycleError> {
    let mut out = StringArray::with_capacity(lines.len())?;
    for line in lines {
        let translated = match line.to_str() {
            Ok(text) if !text.is_empty() => match translate_alternate_color_codes(text) {
                Cow::Borrowed(_) => line.duplicate()?,
                Cow::Owned(changed) => WatString::try_from_str(&changed)?,
            },
            _ => line.duplicate()?,
        };
        out.push(translated)?;
    }
    Ok(out)
}

/// Sign-change handler: replace `lines` with the translated text.
///
/// On allocation failure the event keeps its original lines.
pub fn on_sign_change(event: &mut Shared<SignChangeEvent>) {
    let Some(lines) = event.lines.as_ref() else {
        return;
    };
    let translated = match translate_lines(lines).and_then(Shared::try_new) {
        Ok(t) => t,
        Err(err) => {
            tracing::warn!(error = %err, "sign text left untranslated");
            return;
        }
    };
    let holders = event.ref_count();
    match event.get_mut() {
        Some(event) => lifecycle::reassign(&mut event.lines, Some(translated)),
        None => tracing::warn!(holders, "sign event is shared; text left untranslated"),
    }
}

/// Register [`on_sign_change`] as the sign-change callback of `registry`.
///
/// Returns `true` if it replaced another callback.
pub fn install(registry: &Registry) -> bool {
    tracing::info!("sign color codes enabled");
    registry.register::<SignChangeEvent, _>(on_sign_change)
}
