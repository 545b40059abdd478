use sqlx::QueryBuilder;
use sqlx::sqlite::SqliteRow;

use crate::domain::RepositoryError;
use crate::domain::listing::{ListRequest, Page, SortKey};
use crate::infrastructure::database::DatabasePool;

/// A case-insensitive LIKE filter over a fixed set of columns.
pub struct SearchFilter {
    pattern: String,
    columns: Vec<&'static str>,
}

impl SearchFilter {
    /// Returns `None` for blank search terms.
    pub fn new(term: &str, columns: Vec<&'static str>) -> Option<Self> {
        let trimmed = term.trim();
        if trimmed.is_empty() || columns.is_empty() {
            return None;
        }

        Some(Self {
            pattern: format!("%{}%", escape_like(trimmed)),
            columns,
        })
    }

    fn push_clause(&self, qb: &mut QueryBuilder<'_, sqlx::Sqlite>) {
        qb.push("(");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column);
            qb.push(" LIKE ");
            qb.push_bind(self.pattern.clone());
            qb.push(" ESCAPE '\\'");
        }
        qb.push(")");
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Run a count + page query pair, scoped by an optional `column = value`
/// condition and an optional search filter, and map rows into domain values.
pub async fn paginate<K, R, T, F>(
    pool: &DatabasePool,
    request: &ListRequest<K>,
    base_query: &str,
    count_query: &str,
    order_clause: &str,
    scope: Option<(&'static str, i64)>,
    search: Option<&SearchFilter>,
    map: F,
) -> Result<Page<T>, RepositoryError>
where
    K: SortKey,
    R: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    F: Fn(R) -> T,
{
    let total = {
        let mut qb = QueryBuilder::new(count_query);
        push_conditions(&mut qb, scope, search);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_err(|e| RepositoryError::unexpected(e.to_string()))?;
        count.max(0) as u64
    };

    let mut qb = QueryBuilder::new(base_query);
    push_conditions(&mut qb, scope, search);
    qb.push(" ORDER BY ");
    qb.push(order_clause);

    let (page, page_size, showing_all) = match request.page_size().as_option() {
        Some(limit) => {
            let offset = i64::from(request.page() - 1) * i64::from(limit);
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
            qb.push(" OFFSET ");
            qb.push_bind(offset);
            (request.page(), limit, false)
        }
        None => (1, total.max(1) as u32, true),
    };

    let records = qb
        .build_query_as::<R>()
        .fetch_all(pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

    let items = records.into_iter().map(map).collect();

    Ok(Page::new(items, page, page_size, total, showing_all))
}

fn push_conditions(
    qb: &mut QueryBuilder<'_, sqlx::Sqlite>,
    scope: Option<(&'static str, i64)>,
    search: Option<&SearchFilter>,
) {
    let mut has_where = false;

    if let Some((column, value)) = scope {
        qb.push(" WHERE ");
        qb.push(column);
        qb.push(" = ");
        qb.push_bind(value);
        has_where = true;
    }

    if let Some(filter) = search {
        qb.push(if has_where { " AND " } else { " WHERE " });
        filter.push_clause(qb);
    }
}
