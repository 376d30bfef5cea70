use super::*;
use crate::util::text::{make_plural, make_singular};

impl<'a> QueryBuilder<'a> {
    fn join_kind(&self, analysis: &Analysis) -> &'static str {
        let lower = analysis.raw.to_lowercase();
        self.profile
            .join_kinds
            .iter()
            .find(|(pattern, _)| pattern.is_match(&lower))
            .map_or("JOIN", |(_, kind)| *kind)
    }

    /// A table to pair with `main` when the prompt asks for a join but names one table:
    /// outgoing key, incoming key, then `<table>_id` naming either way.
    fn related_table(&self, main: &Table) -> Option<&'a Table> {
        if let Some(fk) = main.foreign_keys.first() {
            if let Some(table) = self.schema.table(&fk.referenced_table) {
                return Some(table);
            }
        }

        let others = || {
            self.schema
                .tables
                .iter()
                .filter(move |t| !t.name.eq_ignore_ascii_case(&main.name))
        };

        if let Some(table) = others().find(|t| t.foreign_key_to(&main.name).is_some()) {
            return Some(table);
        }

        let main_key = format!("{}_id", make_singular(&main.name.to_lowercase()));
        others()
            .find(|t| t.has_column(&main_key))
            .or_else(|| {
                others().find(|t| {
                    let singular = make_singular(&t.name.to_lowercase());
                    main.has_column(&format!("{}_id", singular))
                })
            })
    }

    /// Tables joined to the main table, each with the predicate that connects it.
    pub(super) fn plan_joins(&self, analysis: &Analysis, main: &'a Table) -> Vec<(&'a Table, JoinClause)> {
        let mut others: Vec<&'a Table> = analysis
            .tables
            .iter()
            .skip(1)
            .filter_map(|t| self.schema.table(&t.name))
            .filter(|t| !t.name.eq_ignore_ascii_case(&main.name))
            .collect();
        if others.is_empty() {
            others.extend(self.related_table(main));
        }

        let kind = self.join_kind(analysis);
        let mut joined: Vec<&'a Table> = vec![main];
        let mut clauses = Vec::new();

        for other in others {
            // connect through whichever already joined table has a real relationship
            let on = joined
                .iter()
                .find_map(|left| related_condition(left, other))
                .unwrap_or_else(|| find_join_condition(main, other));
            joined.push(other);
            clauses.push((
                other,
                JoinClause {
                    kind,
                    table: other.name.clone(),
                    on,
                },
            ));
        }

        clauses
    }
}

fn key_name(table: &Table) -> String {
    table
        .primary_key()
        .map_or_else(|| "id".to_string(), |c| c.name.clone())
}

// Declared keys either way, then `<other>_id` naming either way
fn related_condition(left: &Table, right: &Table) -> Option<String> {
    if let Some(fk) = left.foreign_key_to(&right.name) {
        return Some(format!(
            "{} = {}",
            qualify(&left.name, &fk.column_name),
            qualify(&right.name, &fk.referenced_column)
        ));
    }
    if let Some(fk) = right.foreign_key_to(&left.name) {
        return Some(format!(
            "{} = {}",
            qualify(&right.name, &fk.column_name),
            qualify(&left.name, &fk.referenced_column)
        ));
    }

    let naming = |from: &Table, to: &Table| {
        let to_name = to.name.to_lowercase();
        [format!("{}_id", make_singular(&to_name)), format!("{}_id", to_name), format!("{}_id", make_plural(&to_name))]
            .iter()
            .find_map(|candidate| from.column(candidate))
            .map(|column| {
                format!(
                    "{} = {}",
                    qualify(&from.name, &column.name),
                    qualify(&to.name, &key_name(to))
                )
            })
    };

    naming(left, right).or_else(|| naming(right, left))
}

/// Equality predicate joining two tables; falls back to matching `id` columns.
pub fn find_join_condition(left: &Table, right: &Table) -> String {
    related_condition(left, right)
        .unwrap_or_else(|| format!("{}.id = {}.id", left.name, right.name))
}
