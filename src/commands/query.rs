//! Query the collection from the command line

use anyhow::{anyhow, Result};

use super::post_line;
use crate::content::parse_date;
use crate::query::{QuerySpec, SortOrder};
use crate::Postdex;

/// Query options as given on the command line
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QueryArgs {
    /// Turn the arguments into a query, using `default_limit` when none is given
    pub fn to_spec(&self, default_limit: usize) -> Result<QuerySpec> {
        let date = |raw: &Option<String>| -> Result<Option<chrono::NaiveDate>> {
            raw.as_deref()
                .map(|s| parse_date(s).ok_or_else(|| anyhow!("Invalid date: {}", s)))
                .transpose()
        };

        let sort = match &self.sort {
            Some(s) => s.parse::<SortOrder>().map_err(|e| anyhow!(e))?,
            None => SortOrder::default(),
        };

        Ok(QuerySpec {
            tag: self.tag.clone(),
            author: self.author.clone(),
            date_from: date(&self.from)?,
            date_to: date(&self.to)?,
            text_search: self.search.clone(),
            sort,
            limit: Some(self.limit.unwrap_or(default_limit)),
            offset: self.offset,
        })
    }
}

/// Run a query and print the resulting page
pub fn run(app: &Postdex, args: &QueryArgs, json: bool) -> Result<()> {
    let spec = args.to_spec(app.config.per_page)?;
    let opened = app.open()?;
    let page = opened.store.query_page(&spec);

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!(
        "Showing {} of {} post(s) (offset {})",
        page.items.len(),
        page.total,
        page.offset
    );
    for post in &page.items {
        println!("  {}", post_line(app, post));
    }
    if page.has_next() {
        println!(
            "  ... use --offset {} for more",
            page.offset + page.items.len()
        );
    }
    Ok(())
}
