//! ASCII folding for Latin-script filenames.
//!
//! Covers Latin-1 Supplement, Latin Extended-A/B and Latin Extended
//! Additional (which holds the precomposed Vietnamese letters). Combining
//! marks are dropped so decomposed input (NFD, as produced by macOS file
//! dialogs) folds to the same result as precomposed input.

/// Fold `input` to its closest unaccented ASCII spelling.
///
/// Characters with no known folding are passed through unchanged; the
/// sanitizer strips whatever is still not allowed afterwards.
pub(crate) fn fold_to_ascii(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if is_combining_mark(c) {
            continue;
        } else if let Some(folded) = fold_char(c) {
            out.push_str(folded);
        } else {
            out.push(c);
        }
    }
    out
}

/// Combining Diacritical Marks block plus its extended and supplement blocks.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

#[rustfmt::skip]
fn fold_char(c: char) -> Option<&'static str> {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' | 'Ǎ' | 'Ǟ' | 'Ǡ' | 'Ǻ' | 'Ȁ'
        | 'Ȃ' | 'Ȧ' | 'Ḁ' | 'Ạ' | 'Ả' | 'Ấ' | 'Ầ' | 'Ẩ' | 'Ẫ' | 'Ậ' | 'Ắ' | 'Ằ' | 'Ẳ' | 'Ẵ'
        | 'Ặ' => Some("A"),
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ǎ' | 'ǟ' | 'ǡ' | 'ǻ' | 'ȁ'
        | 'ȃ' | 'ȧ' | 'ḁ' | 'ạ' | 'ả' | 'ấ' | 'ầ' | 'ẩ' | 'ẫ' | 'ậ' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ'
        | 'ặ' => Some("a"),
        'Æ' | 'Ǣ' | 'Ǽ' => Some("AE"),
        'æ' | 'ǣ' | 'ǽ' => Some("ae"),
        'Ɓ' | 'Ƀ' | 'Ḃ' | 'Ḅ' | 'Ḇ' => Some("B"),
        'ƀ' | 'ḃ' | 'ḅ' | 'ḇ' => Some("b"),
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' | 'Ƈ' | 'Ȼ' | 'Ḉ' => Some("C"),
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' | 'ƈ' | 'ȼ' | 'ḉ' => Some("c"),
        'Ð' | 'Ď' | 'Đ' | 'Ɗ' | 'Ḋ' | 'Ḍ' | 'Ḏ' | 'Ḑ' | 'Ḓ' => Some("D"),
        'ð' | 'ď' | 'đ' | 'ȡ' | 'ḋ' | 'ḍ' | 'ḏ' | 'ḑ' | 'ḓ' => Some("d"),
        'Ǆ' | 'Ǳ' => Some("DZ"),
        'ǅ' | 'ǲ' => Some("Dz"),
        'ǆ' | 'ǳ' => Some("dz"),
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' | 'Ȅ' | 'Ȇ' | 'Ȩ' | 'Ɇ' | 'Ḕ'
        | 'Ḗ' | 'Ḙ' | 'Ḛ' | 'Ḝ' | 'Ẹ' | 'Ẻ' | 'Ẽ' | 'Ế' | 'Ề' | 'Ể' | 'Ễ' | 'Ệ' => Some("E"),
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'ȅ' | 'ȇ' | 'ȩ' | 'ɇ' | 'ḕ'
        | 'ḗ' | 'ḙ' | 'ḛ' | 'ḝ' | 'ẹ' | 'ẻ' | 'ẽ' | 'ế' | 'ề' | 'ể' | 'ễ' | 'ệ' => Some("e"),
        'Ƒ' | 'Ḟ' => Some("F"),
        'ƒ' | 'ḟ' => Some("f"),
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' | 'Ɠ' | 'Ǥ' | 'Ǧ' | 'Ǵ' | 'Ḡ' => Some("G"),
        'ĝ' | 'ğ' | 'ġ' | 'ģ' | 'ǥ' | 'ǧ' | 'ǵ' | 'ḡ' => Some("g"),
        'Ĥ' | 'Ħ' | 'Ȟ' | 'Ḣ' | 'Ḥ' | 'Ḧ' | 'Ḩ' | 'Ḫ' => Some("H"),
        'ĥ' | 'ħ' | 'ȟ' | 'ḣ' | 'ḥ' | 'ḧ' | 'ḩ' | 'ḫ' | 'ẖ' => Some("h"),
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' | 'Ɨ' | 'Ǐ' | 'Ȉ' | 'Ȋ' | 'Ḭ'
        | 'Ḯ' | 'Ỉ' | 'Ị' => Some("I"),
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' | 'ǐ' | 'ȉ' | 'ȋ' | 'ḭ' | 'ḯ'
        | 'ỉ' | 'ị' => Some("i"),
        'Ĳ' => Some("IJ"),
        'ĳ' => Some("ij"),
        'Ĵ' | 'Ɉ' => Some("J"),
        'ĵ' | 'ǰ' | 'ȷ' | 'ɉ' => Some("j"),
        'Ķ' | 'Ƙ' | 'Ǩ' | 'Ḱ' | 'Ḳ' | 'Ḵ' => Some("K"),
        'ķ' | 'ƙ' | 'ǩ' | 'ḱ' | 'ḳ' | 'ḵ' => Some("k"),
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' | 'Ƚ' | 'Ḷ' | 'Ḹ' | 'Ḻ' | 'Ḽ' => Some("L"),
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' | 'ƚ' | 'ȴ' | 'ḷ' | 'ḹ' | 'ḻ' | 'ḽ' => Some("l"),
        'Ǉ' => Some("LJ"),
        'ǈ' => Some("Lj"),
        'ǉ' => Some("lj"),
        'Ḿ' | 'Ṁ' | 'Ṃ' => Some("M"),
        'ḿ' | 'ṁ' | 'ṃ' => Some("m"),
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' | 'Ŋ' | 'Ɲ' | 'Ǹ' | 'Ṅ' | 'Ṇ' | 'Ṉ' | 'Ṋ' => Some("N"),
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' | 'ƞ' | 'ǹ' | 'ȵ' | 'ṅ' | 'ṇ' | 'ṉ' | 'ṋ' => Some("n"),
        'Ǌ' => Some("NJ"),
        'ǋ' => Some("Nj"),
        'ǌ' => Some("nj"),
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' | 'Ơ' | 'Ǒ' | 'Ǫ' | 'Ǭ' | 'Ǿ'
        | 'Ȍ' | 'Ȏ' | 'Ȫ' | 'Ȭ' | 'Ȯ' | 'Ȱ' | 'Ṍ' | 'Ṏ' | 'Ṑ' | 'Ṓ' | 'Ọ' | 'Ỏ' | 'Ố' | 'Ồ'
        | 'Ổ' | 'Ỗ' | 'Ộ' | 'Ớ' | 'Ờ' | 'Ở' | 'Ỡ' | 'Ợ' => Some("O"),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'ơ' | 'ǒ' | 'ǫ' | 'ǭ' | 'ǿ'
        | 'ȍ' | 'ȏ' | 'ȫ' | 'ȭ' | 'ȯ' | 'ȱ' | 'ṍ' | 'ṏ' | 'ṑ' | 'ṓ' | 'ọ' | 'ỏ' | 'ố' | 'ồ'
        | 'ổ' | 'ỗ' | 'ộ' | 'ớ' | 'ờ' | 'ở' | 'ỡ' | 'ợ' => Some("o"),
        'Œ' => Some("OE"),
        'œ' => Some("oe"),
        'Ƥ' | 'Ṕ' | 'Ṗ' => Some("P"),
        'ƥ' | 'ṕ' | 'ṗ' => Some("p"),
        'Ŕ' | 'Ŗ' | 'Ř' | 'Ȑ' | 'Ȓ' | 'Ɍ' | 'Ṙ' | 'Ṛ' | 'Ṝ' | 'Ṟ' => Some("R"),
        'ŕ' | 'ŗ' | 'ř' | 'ȑ' | 'ȓ' | 'ɍ' | 'ṙ' | 'ṛ' | 'ṝ' | 'ṟ' => Some("r"),
        'Ś' | 'Ŝ' | 'Ş' | 'Š' | 'Ș' | 'Ṡ' | 'Ṣ' | 'Ṥ' | 'Ṧ' | 'Ṩ' => Some("S"),
        'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' | 'ș' | 'ȿ' | 'ṡ' | 'ṣ' | 'ṥ' | 'ṧ' | 'ṩ' => Some("s"),
        'ẞ' => Some("SS"),
        'ß' => Some("ss"),
        'Ţ' | 'Ť' | 'Ŧ' | 'Ƭ' | 'Ʈ' | 'Ț' | 'Ⱦ' | 'Ṫ' | 'Ṭ' | 'Ṯ' | 'Ṱ' => Some("T"),
        'ţ' | 'ť' | 'ŧ' | 'ƫ' | 'ƭ' | 'ț' | 'ȶ' | 'ṫ' | 'ṭ' | 'ṯ' | 'ṱ' | 'ẗ' => Some("t"),
        'Þ' => Some("TH"),
        'þ' => Some("th"),
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' | 'Ư' | 'Ǔ' | 'Ǖ' | 'Ǘ'
        | 'Ǚ' | 'Ǜ' | 'Ȕ' | 'Ȗ' | 'Ṳ' | 'Ṵ' | 'Ṷ' | 'Ṹ' | 'Ṻ' | 'Ụ' | 'Ủ' | 'Ứ' | 'Ừ' | 'Ử'
        | 'Ữ' | 'Ự' => Some("U"),
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' | 'ǔ' | 'ǖ' | 'ǘ'
        | 'ǚ' | 'ǜ' | 'ȕ' | 'ȗ' | 'ṳ' | 'ṵ' | 'ṷ' | 'ṹ' | 'ṻ' | 'ụ' | 'ủ' | 'ứ' | 'ừ' | 'ử'
        | 'ữ' | 'ự' => Some("u"),
        'Ʋ' | 'Ṽ' | 'Ṿ' => Some("V"),
        'ṽ' | 'ṿ' => Some("v"),
        'Ŵ' | 'Ẁ' | 'Ẃ' | 'Ẅ' | 'Ẇ' | 'Ẉ' => Some("W"),
        'ŵ' | 'ẁ' | 'ẃ' | 'ẅ' | 'ẇ' | 'ẉ' | 'ẘ' => Some("w"),
        'Ẋ' | 'Ẍ' => Some("X"),
        'ẋ' | 'ẍ' => Some("x"),
        'Ý' | 'Ŷ' | 'Ÿ' | 'Ƴ' | 'Ȳ' | 'Ɏ' | 'Ẏ' | 'Ỳ' | 'Ỵ' | 'Ỷ' | 'Ỹ' => Some("Y"),
        'ý' | 'ÿ' | 'ŷ' | 'ƴ' | 'ȳ' | 'ɏ' | 'ẏ' | 'ẙ' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => Some("y"),
        'Ź' | 'Ż' | 'Ž' | 'Ƶ' | 'Ẑ' | 'Ẓ' | 'Ẕ' => Some("Z"),
        'ź' | 'ż' | 'ž' | 'ƶ' | 'ɀ' | 'ẑ' | 'ẓ' | 'ẕ' => Some("z"),
        _ => None,
    }
}
