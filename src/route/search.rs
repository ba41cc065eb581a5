use crate::error::WebError;
use crate::model::chart::ChartSearchRow;
use crate::route::{success_return, RouteResult};
use crate::service::{search::parse_search, SearchService};
use rocket::{get, routes, Route, State};

/// Chart search routes
pub fn routes() -> Vec<Route> {
    routes![search_chart]
}

/// Search charts by keyword
///
/// The keyword string carries inline options (`--level min max`,
/// `--title-only`, `--artist-only`, `--mapper-only`); a query that
/// cannot be parsed is a bad request.
#[get("/chart/search?<keyword>")]
pub async fn search_chart(
    search_service: &State<SearchService>,
    keyword: Option<String>,
) -> RouteResult<Vec<ChartSearchRow>> {
    let keyword = keyword.unwrap_or_default();

    let request = parse_search(&keyword)
        .ok_or_else(|| WebError::input("Malformed search query."))?;

    let charts = search_service.search_chart(&request).await?;

    Ok(success_return(charts))
}
