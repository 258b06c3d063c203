use std::sync::Arc;

use crate::domain::entities::table::{TableCategories, TableName};
use crate::domain::messages::{self, Locale, Message};
use crate::usecase::ports::backend::TableBackend;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCatalog {
    pub tables: Vec<TableName>,
    pub categories: TableCategories,
}

impl TableCatalog {
    pub fn contains(&self, table: &TableName) -> bool {
        self.tables.contains(table)
    }

    /// Category groups for the selector, with uncategorised tables last.
    pub fn grouped(&self) -> Vec<(String, Vec<TableName>)> {
        let mut groups: Vec<(String, Vec<TableName>)> = self
            .categories
            .iter()
            .map(|(name, tables)| {
                let known = tables
                    .iter()
                    .filter(|table| self.contains(table))
                    .cloned()
                    .collect::<Vec<_>>();
                (name.clone(), known)
            })
            .filter(|(_, tables)| !tables.is_empty())
            .collect();

        let rest = self
            .tables
            .iter()
            .filter(|table| !self.categories.values().any(|group| group.contains(table)))
            .cloned()
            .collect::<Vec<_>>();
        if !rest.is_empty() {
            groups.push((String::new(), rest));
        }
        groups
    }
}

pub struct CatalogService {
    backend: Arc<dyn TableBackend>,
    locale: Locale,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn TableBackend>, locale: Locale) -> Self {
        Self { backend, locale }
    }

    /// Loads tables and categories together. Failures collapse into the
    /// generic listing message; the caller may simply retry.
    pub async fn load(&self) -> Result<TableCatalog, String> {
        let (tables, categories) = tokio::join!(
            self.backend.list_tables(),
            self.backend.list_table_categories(),
        );
        match (tables, categories) {
            (Ok(tables), Ok(categories)) => {
                tracing::info!(tables = tables.len(), "loaded table catalog");
                Ok(TableCatalog { tables, categories })
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "failed to load table catalog");
                Err(messages::text(self.locale, Message::LoadTablesFailed).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn grouped_puts_uncategorised_tables_last() {
        let mut categories = BTreeMap::new();
        categories.insert(
            "storage".to_string(),
            vec![TableName::from("disks"), TableName::from("retired")],
        );
        let catalog = TableCatalog {
            tables: vec!["disks".into(), "users".into()],
            categories,
        };

        let groups = catalog.grouped();

        assert_eq!(
            groups,
            vec![
                ("storage".to_string(), vec![TableName::from("disks")]),
                (String::new(), vec![TableName::from("users")]),
            ]
        );
    }
}
