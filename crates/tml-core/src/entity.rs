//! Name → code-point table for HTML entity substitution.
//!
//! Ported from the reference implementation's entity table. That table is
//! not fully sorted and contains duplicate keys where an accented capital
//! letter's code point was recorded under the lowercase entity name (e.g.
//! two `"aacute"` entries, `0x00C1` and `0x00E1`); this port sorts by name
//! and keeps the later value for any duplicate, which recovers the correct
//! HTML4 mapping in every observed case (the lowercase entity name maps to
//! the lowercase accented character, `darr` to the single arrow rather than
//! the double arrow, and so on).

/// Sorted, deduplicated `(entity_name, code_point)` table.
pub static ENTITIES: &[(&str, char)] = &[
    ("aacute", '\u{00e1}'),
    ("acirc", '\u{00e2}'),
    ("acute", '\u{00b4}'),
    ("aelig", '\u{00e6}'),
    ("agrave", '\u{00e0}'),
    ("alefsym", '\u{2135}'),
    ("alpha", '\u{03b1}'),
    ("amp", '\u{0026}'),
    ("and", '\u{22a5}'),
    ("ang", '\u{2220}'),
    ("apos", '\u{0027}'),
    ("aring", '\u{00e5}'),
    ("asymp", '\u{2248}'),
    ("atilde", '\u{00e3}'),
    ("auml", '\u{00e4}'),
    ("bdquo", '\u{201e}'),
    ("beta", '\u{03b2}'),
    ("brvbar", '\u{00a6}'),
    ("bull", '\u{2022}'),
    ("cap", '\u{2229}'),
    ("ccedil", '\u{00e7}'),
    ("cedil", '\u{00b8}'),
    ("cent", '\u{00a2}'),
    ("chi", '\u{03c7}'),
    ("circ", '\u{02c6}'),
    ("clubs", '\u{2663}'),
    ("cong", '\u{2245}'),
    ("copy", '\u{00a9}'),
    ("crarr", '\u{21b5}'),
    ("cup", '\u{222a}'),
    ("curren", '\u{00a4}'),
    ("dagger", '\u{2020}'),
    ("darr", '\u{2193}'),
    ("deg", '\u{00b0}'),
    ("delta", '\u{03b4}'),
    ("diams", '\u{2666}'),
    ("divide", '\u{00f7}'),
    ("eacute", '\u{00e9}'),
    ("ecirc", '\u{00ea}'),
    ("egrave", '\u{00e8}'),
    ("empty", '\u{2205}'),
    ("emsp", '\u{2003}'),
    ("ensp", '\u{2002}'),
    ("epsilon", '\u{03b5}'),
    ("equiv", '\u{2261}'),
    ("eta", '\u{03b7}'),
    ("eth", '\u{00f0}'),
    ("euml", '\u{00eb}'),
    ("euro", '\u{20ac}'),
    ("exist", '\u{2203}'),
    ("fnof", '\u{0192}'),
    ("forall", '\u{2200}'),
    ("frac12", '\u{00bd}'),
    ("frac14", '\u{00bc}'),
    ("frac34", '\u{00be}'),
    ("frasl", '\u{2044}'),
    ("gamma", '\u{03b3}'),
    ("ge", '\u{2265}'),
    ("gt", '\u{003e}'),
    ("harr", '\u{2194}'),
    ("hearts", '\u{2665}'),
    ("hellip", '\u{2026}'),
    ("iacute", '\u{00ed}'),
    ("icirc", '\u{00ee}'),
    ("iexcl", '\u{00a1}'),
    ("igrave", '\u{00ec}'),
    ("image", '\u{2111}'),
    ("infin", '\u{221e}'),
    ("int", '\u{222b}'),
    ("iota", '\u{03b9}'),
    ("iquest", '\u{00bf}'),
    ("isin", '\u{2208}'),
    ("iuml", '\u{00ef}'),
    ("kappa", '\u{03ba}'),
    ("lambda", '\u{03bb}'),
    ("lang", '\u{2329}'),
    ("laquo", '\u{00ab}'),
    ("larr", '\u{2190}'),
    ("lceil", '\u{2308}'),
    ("ldquo", '\u{201c}'),
    ("le", '\u{2264}'),
    ("lfloor", '\u{230a}'),
    ("lowast", '\u{2217}'),
    ("loz", '\u{25ca}'),
    ("lrm", '\u{200e}'),
    ("lsaquo", '\u{2039}'),
    ("lsquo", '\u{2018}'),
    ("lt", '\u{003c}'),
    ("macr", '\u{00af}'),
    ("mdash", '\u{2014}'),
    ("micro", '\u{00b5}'),
    ("middot", '\u{00b7}'),
    ("minus", '\u{2212}'),
    ("mu", '\u{03bc}'),
    ("nabla", '\u{2207}'),
    ("nbsp", '\u{00a0}'),
    ("ndash", '\u{2013}'),
    ("ne", '\u{2260}'),
    ("ni", '\u{220b}'),
    ("not", '\u{00ac}'),
    ("notin", '\u{2209}'),
    ("nsub", '\u{2284}'),
    ("ntilde", '\u{00f1}'),
    ("nu", '\u{03bd}'),
    ("oacute", '\u{00f3}'),
    ("ocirc", '\u{00f4}'),
    ("oelig", '\u{0153}'),
    ("ograve", '\u{00f2}'),
    ("oline", '\u{203e}'),
    ("omega", '\u{03c9}'),
    ("omicron", '\u{03bf}'),
    ("oplus", '\u{2295}'),
    ("or", '\u{22a6}'),
    ("ordf", '\u{00aa}'),
    ("ordm", '\u{00ba}'),
    ("oslash", '\u{00f8}'),
    ("otilde", '\u{00f5}'),
    ("otimes", '\u{2297}'),
    ("ouml", '\u{00f6}'),
    ("para", '\u{00b6}'),
    ("part", '\u{2202}'),
    ("percnt", '\u{0025}'),
    ("permil", '\u{2030}'),
    ("perp", '\u{22a5}'),
    ("phi", '\u{03c6}'),
    ("pi", '\u{03c0}'),
    ("piv", '\u{03d6}'),
    ("plusmn", '\u{00b1}'),
    ("pound", '\u{00a3}'),
    ("prime", '\u{2032}'),
    ("prod", '\u{220f}'),
    ("prop", '\u{221d}'),
    ("psi", '\u{03c8}'),
    ("quot", '\u{0022}'),
    ("radic", '\u{221a}'),
    ("rang", '\u{232a}'),
    ("raquo", '\u{00bb}'),
    ("rarr", '\u{2192}'),
    ("rceil", '\u{2309}'),
    ("rdquo", '\u{201d}'),
    ("real", '\u{211c}'),
    ("reg", '\u{00ae}'),
    ("rfloor", '\u{230b}'),
    ("rho", '\u{03c1}'),
    ("rlm", '\u{200f}'),
    ("rsaquo", '\u{203a}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201a}'),
    ("scaron", '\u{0161}'),
    ("sdot", '\u{22c5}'),
    ("sect", '\u{00a7}'),
    ("shy", '\u{00ad}'),
    ("sigma", '\u{03c3}'),
    ("sigmaf", '\u{03c2}'),
    ("sim", '\u{223c}'),
    ("spades", '\u{2660}'),
    ("sub", '\u{2282}'),
    ("sube", '\u{2286}'),
    ("sum", '\u{2211}'),
    ("sup", '\u{2283}'),
    ("sup1", '\u{00b9}'),
    ("sup2", '\u{00b2}'),
    ("sup3", '\u{00b3}'),
    ("supe", '\u{2287}'),
    ("szlig", '\u{00df}'),
    ("tau", '\u{03c4}'),
    ("there4", '\u{2234}'),
    ("theta", '\u{03b8}'),
    ("thetasym", '\u{03d1}'),
    ("thinsp", '\u{2009}'),
    ("thorn", '\u{00fe}'),
    ("tilde", '\u{02dc}'),
    ("times", '\u{00d7}'),
    ("trade", '\u{2122}'),
    ("uacute", '\u{00fa}'),
    ("uarr", '\u{2191}'),
    ("ucirc", '\u{00fb}'),
    ("ugrave", '\u{00f9}'),
    ("uml", '\u{00a8}'),
    ("upsih", '\u{03d2}'),
    ("upsilon", '\u{03c5}'),
    ("uuml", '\u{00fc}'),
    ("weierp", '\u{2118}'),
    ("xi", '\u{03be}'),
    ("yacute", '\u{00fd}'),
    ("yen", '\u{00a5}'),
    ("yuml", '\u{00ff}'),
    ("zeta", '\u{03b6}'),
    ("zwj", '\u{200d}'),
    ("zwnj", '\u{200c}'),
];

/// Resolves an HTML entity name (without the surrounding `&`/`;`) to its
/// Unicode scalar value via binary search.
#[must_use]
pub fn entity_lookup(name: &str) -> Option<char> {
    ENTITIES
        .binary_search_by_key(&name, |(n, _)| n)
        .ok()
        .map(|i| ENTITIES[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(ENTITIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_entities_resolve() {
        assert_eq!(entity_lookup("amp"), Some('&'));
        assert_eq!(entity_lookup("lt"), Some('<'));
        assert_eq!(entity_lookup("aacute"), Some('\u{e1}'));
        assert_eq!(entity_lookup("copy"), Some('\u{a9}'));
    }

    #[test]
    fn unknown_entity_resolves_to_none() {
        assert_eq!(entity_lookup("notarealentity"), None);
    }

    #[test]
    fn table_has_no_duplicate_names() {
        for w in ENTITIES.windows(2) {
            assert_ne!(w[0].0, w[1].0);
        }
    }
}
