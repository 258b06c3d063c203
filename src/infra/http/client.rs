use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::domain::entities::query::RowsQuery;
use crate::domain::entities::table::{RowsPage, Schema, TableCategories, TableName};
use crate::infra::http::wire::{CategoriesResponse, RowsResponse, SchemaResponse, TablesResponse};
use crate::usecase::ports::backend::{BackendError, TableBackend};

/// Longest error body kept in a [`BackendError::Status`] message.
const MAX_ERROR_BODY: usize = 512;

pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| BackendError::InvalidRequest(format!("bad base url {base_url}: {err}")))?;
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;
        let client = builder
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::InvalidRequest(format!("base url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, BackendError> {
        tracing::debug!(%url, ?params, "GET");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|idx| message.is_char_boundary(*idx))
                    .unwrap_or(0);
                message.truncate(cut);
            }
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

/// Query string for a rows request. Inactive parts are left out entirely.
pub fn rows_query_params(query: &RowsQuery) -> Result<Vec<(&'static str, String)>, BackendError> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("page_size", query.page_size.to_string()),
    ];
    if query.export {
        params.push(("export", "true".to_string()));
    }
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }
    if let Some(sort) = &query.sort {
        params.push(("sort_by", sort.column.clone()));
        params.push(("sort_order", sort.order.as_str().to_string()));
    }
    if let Some(filters) = &query.filters {
        let encoded = serde_json::to_string(filters)
            .map_err(|err| BackendError::InvalidRequest(format!("unencodable filters: {err}")))?;
        params.push(("filters", encoded));
    }
    Ok(params)
}

#[async_trait]
impl TableBackend for HttpBackend {
    async fn list_tables(&self) -> Result<Vec<TableName>, BackendError> {
        let url = self.endpoint(&["tables"])?;
        let response: TablesResponse = self.get_json(url, &[]).await?;
        Ok(response.into_tables())
    }

    async fn list_table_categories(&self) -> Result<TableCategories, BackendError> {
        let url = self.endpoint(&["tables", "categories"])?;
        let response: CategoriesResponse = self.get_json(url, &[]).await?;
        Ok(response.categories)
    }

    async fn get_schema(&self, table: &TableName) -> Result<Schema, BackendError> {
        let url = self.endpoint(&["tables", table.as_str(), "schema"])?;
        let response: SchemaResponse = self.get_json(url, &[]).await?;
        Ok(Schema {
            columns: response.columns,
        })
    }

    async fn get_rows(
        &self,
        table: &TableName,
        query: &RowsQuery,
    ) -> Result<RowsPage, BackendError> {
        let url = self.endpoint(&["tables", table.as_str(), "rows"])?;
        let params = rows_query_params(query)?;
        let response: RowsResponse = self.get_json(url, &params).await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::domain::entities::query::{FilterOp, FilterSpec, SortOrder, SortSpec};

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(5)).expect("backend should build")
    }

    #[test]
    fn plain_page_sends_only_paging() {
        let params = rows_query_params(&RowsQuery::page_of(2, 50)).expect("params");

        assert_eq!(
            params,
            vec![("page", "2".to_string()), ("page_size", "50".to_string())]
        );
    }

    #[test]
    fn active_parts_are_all_sent() {
        let mut filters = BTreeMap::new();
        filters.insert(
            "age".to_string(),
            FilterSpec {
                op: FilterOp::Gt,
                value: json!(30),
            },
        );
        let query = RowsQuery {
            page: 1,
            page_size: 25,
            export: true,
            search: Some("ali".to_string()),
            sort: Some(SortSpec {
                column: "name".to_string(),
                order: SortOrder::Desc,
            }),
            filters: Some(filters),
        };

        let params = rows_query_params(&query).expect("params");

        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("page_size", "25".to_string()),
                ("export", "true".to_string()),
                ("search", "ali".to_string()),
                ("sort_by", "name".to_string()),
                ("sort_order", "desc".to_string()),
                ("filters", r#"{"age":["gt",30]}"#.to_string()),
            ]
        );
    }

    #[test]
    fn endpoint_encodes_table_segment() {
        let backend = backend("http://nas.local/api/db/");

        let url = backend
            .endpoint(&["tables", "odd name/x", "rows"])
            .expect("url should build");

        assert_eq!(url.as_str(), "http://nas.local/api/db/tables/odd%20name%2Fx/rows");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = HttpBackend::new("not a url", Duration::from_secs(1));

        assert!(matches!(result, Err(BackendError::InvalidRequest(_))));
    }
}
