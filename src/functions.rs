//! C4.3 — the closed `$filter` method whitelist and its per-dialect SQL
//! rendering. `crate::parser::filter` already rejects any call whose name
//! is not in this set before an AST node is even built; this module is
//! the single place that knows how each whitelisted name becomes SQL text.

/// Function category, used only for documentation/error messages — dispatch
/// itself is the exhaustive `match` in [`render_call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCategory {
    StringFn,
    MathFn,
    DateTimeFn,
    GeoFn,
}

#[must_use]
pub fn category_of(name: &str) -> Option<FunctionCategory> {
    match name {
        "contains" | "startswith" | "endswith" | "length" | "indexof" | "substring" | "tolower" | "toupper"
        | "trim" | "concat" => Some(FunctionCategory::StringFn),
        "round" | "floor" | "ceiling" => Some(FunctionCategory::MathFn),
        "year" | "month" | "day" | "hour" | "minute" | "second" | "fractionalseconds" | "date" | "time" | "now" => {
            Some(FunctionCategory::DateTimeFn)
        }
        "geo.distance" | "geo.intersects" | "geo.length" => Some(FunctionCategory::GeoFn),
        _ => None,
    }
}

/// Renders a whitelisted function call given its already-rendered SQL
/// argument fragments. Dialects override only the entries that differ from
/// the ANSI form (`crate::dialect::SqlDialect::render_function`); this is
/// the ANSI-default table every dialect starts from.
#[must_use]
pub fn render_ansi(name: &str, args: &[String]) -> String {
    match (name, args) {
        ("contains", [haystack, needle]) => format!("({haystack} LIKE '%' || {needle} || '%')"),
        ("startswith", [haystack, needle]) => format!("({haystack} LIKE {needle} || '%')"),
        ("endswith", [haystack, needle]) => format!("({haystack} LIKE '%' || {needle})"),
        ("length", [s]) => format!("CHAR_LENGTH({s})"),
        ("indexof", [haystack, needle]) => format!("(POSITION({needle} IN {haystack}) - 1)"),
        ("substring", [s, start]) => format!("SUBSTRING({s} FROM {start} + 1)"),
        ("substring", [s, start, len]) => format!("SUBSTRING({s} FROM {start} + 1 FOR {len})"),
        ("tolower", [s]) => format!("LOWER({s})"),
        ("toupper", [s]) => format!("UPPER({s})"),
        ("trim", [s]) => format!("TRIM({s})"),
        ("concat", args) => format!("({})", args.join(" || ")),
        ("round", [n]) => format!("ROUND({n})"),
        ("floor", [n]) => format!("FLOOR({n})"),
        ("ceiling", [n]) => format!("CEILING({n})"),
        ("year", [d]) => format!("EXTRACT(YEAR FROM {d})"),
        ("month", [d]) => format!("EXTRACT(MONTH FROM {d})"),
        ("day", [d]) => format!("EXTRACT(DAY FROM {d})"),
        ("hour", [d]) => format!("EXTRACT(HOUR FROM {d})"),
        ("minute", [d]) => format!("EXTRACT(MINUTE FROM {d})"),
        ("second", [d]) => format!("EXTRACT(SECOND FROM {d})"),
        ("fractionalseconds", [d]) => format!("(EXTRACT(SECOND FROM {d}) - FLOOR(EXTRACT(SECOND FROM {d})))"),
        ("date", [d]) => format!("CAST({d} AS DATE)"),
        ("time", [d]) => format!("CAST({d} AS TIME)"),
        ("now", []) => "CURRENT_TIMESTAMP".to_string(),
        ("geo.distance", [a, b]) => format!("ST_Distance({a}, {b})"),
        ("geo.intersects", [a, b]) => format!("ST_Intersects({a}, {b})"),
        ("geo.length", [a]) => format!("ST_Length({a})"),
        _ => unreachable!("parser only admits whitelisted arities for {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_whitelisted_name_has_a_category() {
        for name in [
            "contains",
            "startswith",
            "endswith",
            "length",
            "indexof",
            "substring",
            "tolower",
            "toupper",
            "trim",
            "concat",
            "round",
            "floor",
            "ceiling",
            "year",
            "month",
            "day",
            "hour",
            "minute",
            "second",
            "fractionalseconds",
            "date",
            "time",
            "now",
            "geo.distance",
            "geo.intersects",
            "geo.length",
        ] {
            assert!(category_of(name).is_some(), "{name} missing category");
        }
    }

    #[test]
    fn unknown_name_has_no_category() {
        assert!(category_of("exec").is_none());
    }
}
