use super::{DialectKind, SqlDialect};
use crate::ast::CompareOp;

/// SurrealDB: the one dialect whose parameterization scheme is not "emit a
/// bare placeholder". Field references go through `type::field($fieldN)`,
/// table references through `type::table($tableN)`; every logical AND/OR/NOT
/// operand must be explicitly parenthesized because SurrealQL's grammar
/// does not give `AND` a documented precedence over `OR` the way the other
/// five dialects do; `$orderby` identifiers are the sole remaining
/// exception to invariant I1 and are emitted as backtick-escaped SQL text,
/// since `ORDER BY type::field(...)` is not accepted there.
pub struct SurrealDb;

impl SqlDialect for SurrealDb {
    fn kind(&self) -> DialectKind {
        DialectKind::SurrealDb
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "\\`"))
    }

    fn field_param_token(&self, name: &str) -> String {
        format!("type::field({})", self.param_token(name))
    }

    fn table_param_token(&self, name: &str) -> String {
        format!("type::table({})", self.param_token(name))
    }

    fn identifiers_are_parameterized(&self) -> bool {
        true
    }

    fn render_table_reference(&self, _table_name: &str, table_param: &str) -> String {
        self.table_param_token(table_param)
    }

    fn string_literal_token(&self, name: &str) -> String {
        format!("type::string({})", self.param_token(name))
    }

    fn compare_operator(&self, op: CompareOp) -> &'static str {
        match op {
            CompareOp::Ne => "!=",
            other => SqlDialect::compare_operator(&super::Ansi, other),
        }
    }

    fn and_keyword(&self) -> &'static str {
        "&&"
    }

    fn or_keyword(&self) -> &'static str {
        "||"
    }

    fn wrap_logical(&self, rendered: String) -> String {
        format!("({rendered})")
    }

    fn render_not(&self, inner: &str) -> String {
        format!("!({inner})")
    }

    fn in_list_brackets(&self) -> (&'static str, &'static str) {
        ("[", "]")
    }

    fn render_in_list(&self, items: &[(String, Option<String>)]) -> String {
        let mut out = Vec::with_capacity(items.len());
        for (rendered, string_param) in items {
            match string_param {
                Some(name) => {
                    out.push(self.string_literal_token(name));
                    out.push(format!("type::record({})", self.param_token(name)));
                }
                None => out.push(rendered.clone()),
            }
        }
        out.join(", ")
    }

    fn render_compare(
        &self,
        op: CompareOp,
        left: &str,
        right_rendered: &str,
        string_literal_param: Option<&str>,
    ) -> String {
        let Some(name) = string_literal_param else {
            return format!("{left} {} {right_rendered}", self.compare_operator(op));
        };
        let as_string = self.string_literal_token(name);
        let as_record = format!("type::record({})", self.param_token(name));
        match op {
            CompareOp::Eq => format!("({left} = {as_string} OR {left} = {as_record})"),
            CompareOp::Ne => format!("({left} != {as_string} AND {left} != {as_record})"),
            _ => format!("{left} {} {as_string}", self.compare_operator(op)),
        }
    }

    fn render_pagination(&self, top: Option<&str>, skip: Option<&str>) -> String {
        let mut clauses = Vec::new();
        if let Some(t) = top {
            clauses.push(format!("LIMIT {t}"));
        }
        if let Some(s) = skip {
            clauses.push(format!("START {s}"));
        }
        clauses.join(" ")
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        match (name, args) {
            ("contains", [haystack, needle]) => format!("string::contains({haystack}, {needle})"),
            ("startswith", [haystack, needle]) => format!("string::starts_with({haystack}, {needle})"),
            ("endswith", [haystack, needle]) => format!("string::ends_with({haystack}, {needle})"),
            ("length", [s]) => format!("string::len({s})"),
            ("indexof", [haystack, needle]) => format!("array::find_index({haystack}, {needle})"),
            ("substring", [s, start]) => format!("string::slice({s}, {start})"),
            ("substring", [s, start, len]) => format!("string::slice({s}, {start}, {len})"),
            ("tolower", [s]) => format!("string::lowercase({s})"),
            ("toupper", [s]) => format!("string::uppercase({s})"),
            ("trim", [s]) => format!("string::trim({s})"),
            ("concat", args) => format!("array::join([{}], '')", args.join(", ")),
            ("round", [n]) => format!("math::round({n})"),
            ("floor", [n]) => format!("math::floor({n})"),
            ("ceiling", [n]) => format!("math::ceil({n})"),
            ("now", []) => "time::now()".to_string(),
            ("year", [d]) => format!("time::year({d})"),
            ("month", [d]) => format!("time::month({d})"),
            ("day", [d]) => format!("time::day({d})"),
            ("hour", [d]) => format!("time::hour({d})"),
            ("minute", [d]) => format!("time::minute({d})"),
            ("second", [d]) => format!("time::second({d})"),
            ("geo.distance", [a, b]) => format!("geo::distance({a}, {b})"),
            _ => crate::functions::render_ansi(name, args),
        }
    }
}
