//! Best-effort English inflection for relation tokens.
//!
//! Only the last word of a `snake_case` or `kebab-case` token is inflected, so
//! `book_author` becomes `book_authors`. Irregular and uncountable words are
//! checked before the suffix rules; the first matching rule wins.

use once_cell::sync::Lazy;
use regex::Regex;

const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "jeans",
    "metadata",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

/// `(singular, plural)`
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("criterion", "criteria"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("move", "moves"),
    ("person", "people"),
    ("sex", "sexes"),
    ("tooth", "teeth"),
    ("woman", "women"),
    ("zombie", "zombies"),
];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn compile(rules: &[(&str, &'static str)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|&(pattern, replacement)| Rule {
            pattern: Regex::new(&format!("(?i){pattern}")).expect("valid inflection rule"),
            replacement,
        })
        .collect()
}

static PLURAL_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    compile(&[
        (r"(quiz)$", "${1}zes"),
        (r"^(oxen)$", "${1}"),
        (r"^(ox)$", "${1}en"),
        (r"(m|l)ice$", "${1}ice"),
        (r"(m|l)ouse$", "${1}ice"),
        (r"(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(x|ch|ss|sh)$", "${1}es"),
        (r"([^aeiouy]|qu)y$", "${1}ies"),
        (r"(hive)$", "${1}s"),
        (r"(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
        (r"sis$", "ses"),
        (r"([ti])a$", "${1}a"),
        (r"([ti])um$", "${1}a"),
        (r"(buffal|tomat)o$", "${1}oes"),
        (r"(bu)s$", "${1}ses"),
        (r"(alias|status)$", "${1}es"),
        (r"(octop|vir)i$", "${1}i"),
        (r"(octop|vir)us$", "${1}i"),
        (r"^(ax|test)is$", "${1}es"),
        (r"s$", "s"),
        (r"$", "s"),
    ])
});

static SINGULAR_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    compile(&[
        (r"(database)s$", "${1}"),
        (r"(quiz)zes$", "${1}"),
        (r"(matr)ices$", "${1}ix"),
        (r"(vert|ind)ices$", "${1}ex"),
        (r"^(ox)en", "${1}"),
        (r"(alias|status)(es)?$", "${1}"),
        (r"(octop|vir)(us|i)$", "${1}us"),
        (r"^(a)x[ie]s$", "${1}xis"),
        (r"(cris|test)(is|es)$", "${1}is"),
        (r"(shoe)s$", "${1}"),
        (r"(o)es$", "${1}"),
        (r"(bus)(es)?$", "${1}"),
        (r"(m|l)ice$", "${1}ouse"),
        (r"(x|ch|ss|sh)es$", "${1}"),
        (r"(m)ovies$", "${1}ovie"),
        (r"([^aeiouy]|qu)ies$", "${1}y"),
        (r"([lr])ves$", "${1}f"),
        (r"(tive)s$", "${1}"),
        (r"(hive)s$", "${1}"),
        (r"([^f])ves$", "${1}fe"),
        (
            r"((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(sis|ses)$",
            "${1}sis",
        ),
        (r"([ti])a$", "${1}um"),
        (r"(ss)$", "${1}"),
        (r"s$", ""),
    ])
});

/// Split `token` into its prefix and the word that gets inflected
fn split_last_word(token: &str) -> (&str, &str) {
    match token.rfind(['_', '-']) {
        Some(index) => token.split_at(index + 1),
        None => ("", token),
    }
}

/// Re-apply the casing of `original` to a replacement word
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().all(|c| !c.is_lowercase()) && original.chars().any(char::is_uppercase) {
        return replacement.to_uppercase();
    }
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut out = String::with_capacity(replacement.len());
            let mut rest = replacement.chars();
            if let Some(head) = rest.next() {
                out.extend(head.to_uppercase());
            }
            out.extend(rest);
            out
        }
        _ => replacement.to_string(),
    }
}

fn inflect(token: &str, rules: &[Rule], irregular: impl Fn(&str) -> Option<&'static str>) -> String {
    let (prefix, word) = split_last_word(token);
    if word.is_empty() {
        return token.to_string();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return token.to_string();
    }
    if let Some(replacement) = irregular(&lower) {
        return format!("{prefix}{}", match_case(word, replacement));
    }

    for rule in rules {
        if rule.pattern.is_match(word) {
            let inflected = rule.pattern.replace(word, rule.replacement);
            return format!("{prefix}{inflected}");
        }
    }
    token.to_string()
}

/// Plural form of the last word of `token`
#[must_use]
pub fn pluralize(token: &str) -> String {
    inflect(token, &PLURAL_RULES, |word| {
        IRREGULAR
            .iter()
            .find(|(singular, plural)| *singular == word || *plural == word)
            .map(|(_, plural)| *plural)
    })
}

/// Singular form of the last word of `token`
#[must_use]
pub fn singularize(token: &str) -> String {
    inflect(token, &SINGULAR_RULES, |word| {
        IRREGULAR
            .iter()
            .find(|(singular, plural)| *singular == word || *plural == word)
            .map(|(singular, _)| *singular)
    })
}
