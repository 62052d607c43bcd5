//! Filesystem-safe output names.
//!
//! Every output file is named `{stem}{suffix}{extension}` where the stem is
//! the sanitized input stem:
//!
//! 1. Split at the last `.`; the extension keeps its dot and its case.
//! 2. Fold accented letters to ASCII (`Ảnh` → `Anh`, `Straße` → `Strasse`).
//! 3. Collapse every whitespace run into a single `_`.
//! 4. Drop anything that is not an ASCII letter, digit, `_`, `-` or `.`.
//!
//! - `"Ảnh đẹp quá.png"` → `"Anh_dep_qua.png"`
//! - `"a#b@c!!!.jpg"` → `"abc.jpg"`
//! - `"写真.png"` → `".png"` (empty stems are kept, see [`SanitizedName`])
//!
//! Sanitizing never looks at the output directory, so two inputs that clean
//! to the same name overwrite each other (last write wins).

use crate::transliterate::fold_to_ascii;

/// Stem and extension of a sanitized filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedName {
    /// Cleaned stem. May be empty when nothing in the original survives.
    pub base_name: String,
    /// Original extension including the leading dot, or empty.
    pub extension: String,
}

impl SanitizedName {
    /// `base_name + extension`, the same string [`sanitize`] returns.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }

    /// Output filename with `suffix` inserted before the extension.
    ///
    /// `extension` replaces the original extension when given; it must carry
    /// its own leading dot.
    pub fn with_suffix(&self, suffix: &str, extension: Option<&str>) -> String {
        let ext = extension.unwrap_or(&self.extension);
        format!("{}{}{}", self.base_name, suffix, ext)
    }
}

/// Split a filename into stem and extension at the last dot.
///
/// A dot in the first position marks a hidden file, not an extension:
/// `".bashrc"` has stem `".bashrc"` and no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename.split_at(pos),
        _ => (filename, ""),
    }
}

/// Sanitize a filename into its stem and extension parts.
pub fn sanitize_parts(filename: &str) -> SanitizedName {
    let (stem, extension) = split_extension(filename);
    SanitizedName {
        base_name: clean_stem(stem),
        extension: extension.to_string(),
    }
}

/// Sanitize a filename, keeping its extension verbatim.
pub fn sanitize(filename: &str) -> String {
    sanitize_parts(filename).file_name()
}

/// Build the output filename for `filename`.
///
/// Shorthand for [`sanitize_parts`] followed by [`SanitizedName::with_suffix`].
pub fn output_file_name(filename: &str, suffix: &str, extension: Option<&str>) -> String {
    sanitize_parts(filename).with_suffix(suffix, extension)
}

fn clean_stem(stem: &str) -> String {
    let folded = fold_to_ascii(stem);
    let mut out = String::with_capacity(folded.len());
    let mut in_whitespace = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if is_allowed(c) {
            out.push(c);
        }
    }
    out
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vietnamese_name_is_folded() {
        assert_eq!(sanitize("Ảnh đẹp quá.png"), "Anh_dep_qua.png");
    }

    #[test]
    fn illegal_characters_stripped() {
        assert_eq!(sanitize("a#b@c!!!.jpg"), "abc.jpg");
    }

    #[test]
    fn clean_name_unchanged() {
        for name in ["hero_idle-01.png", "Tile.JPG", "a.b.c.png", "plain"] {
            assert_eq!(sanitize(name), name);
        }
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(sanitize("my   big\t\tfile.png"), "my_big_file.png");
        assert_eq!(sanitize(" leading.png"), "_leading.png");
    }

    #[test]
    fn whitespace_around_stripped_chars_still_collapses_once() {
        // The `&` is dropped after the whitespace runs were collapsed.
        assert_eq!(sanitize("rock & roll.png"), "rock__roll.png");
    }

    #[test]
    fn extension_kept_verbatim() {
        assert_eq!(sanitize("Café Menu.PNG"), "Cafe_Menu.PNG");
        assert_eq!(sanitize("weird.p#g"), "weird.p#g");
    }

    #[test]
    fn split_at_last_dot() {
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn inner_dots_survive() {
        assert_eq!(sanitize("v1.2 final.png"), "v1.2_final.png");
    }

    #[test]
    fn empty_stem_is_legal() {
        let parts = sanitize_parts("写真.png");
        assert_eq!(parts.base_name, "");
        assert_eq!(parts.extension, ".png");
        assert_eq!(parts.with_suffix("_u", None), "_u.png");
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn suffix_and_override_extension() {
        assert_eq!(
            output_file_name("Ảnh đẹp.jpeg", "_u", Some(".png")),
            "Anh_dep_u.png"
        );
        assert_eq!(output_file_name("sprite.PNG", "_u", None), "sprite_u.PNG");
    }

    #[test]
    fn path_separators_are_stripped() {
        assert_eq!(sanitize("../../etc/passwd.png"), "....etcpasswd.png");
    }
}
