use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Select,
    sea_query::{Expr, Func},
};

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub trait ContainsInsensitive {
    /// Keep rows whose `column` contains `needle`, ignoring case.
    fn filter_contains_ci<C: ColumnTrait>(self, column: C, needle: &str) -> Self;
}

impl<E> ContainsInsensitive for Select<E>
where
    E: EntityTrait,
{
    fn filter_contains_ci<C: ColumnTrait>(self, column: C, needle: &str) -> Self {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        self.filter(Expr::expr(Func::lower(Expr::col(column))).like(pattern))
    }
}
