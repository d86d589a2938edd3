//! Query builders for each search intent
//!
//! Pure functions: every call builds a fresh [`SearchBody`] from its inputs.

use crate::pagination::Page;
use crate::query::{
    BoolOperator, BoolQuery, FieldSort, MultiMatchQuery, MultiMatchType, Query, QueryStringQuery,
    RangeClause, SearchBody,
};

/// Unified full-text field covering every searchable part of a document.
pub const FIELD_EVERYTHING: &str = "everything";

/// Post creation timestamp.
pub const FIELD_CREATED_AT: &str = "created_at";

pub const FIELD_HAS_AVATAR: &str = "has_avatar";
pub const FIELD_HAS_BANNER: &str = "has_banner";

/// Search-as-you-type field and its shingle sub-fields.
pub const TYPEAHEAD_FIELDS: [&str; 3] = ["typeahead", "typeahead._2gram", "typeahead._3gram"];

/// Fixed result count for typeahead suggestions.
pub const TYPEAHEAD_SIZE: u32 = 30;

/// Knobs for post search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostQueryOptions {
    /// Drop posts timestamped after query time.
    pub exclude_future: bool,
}

/// Post search: newest first, never by relevance.
pub fn posts_query(text: &str, page: Page, options: PostQueryOptions) -> SearchBody {
    let matching = Query::matching(FIELD_EVERYTHING, text);

    let query = if options.exclude_future {
        Query::Bool(BoolQuery {
            must: vec![matching],
            filter: vec![Query::range(
                FIELD_CREATED_AT,
                RangeClause::at_most("now"),
            )],
            ..BoolQuery::default()
        })
    } else {
        matching
    };

    SearchBody::new(query)
        .with_sort(FieldSort::desc(FIELD_CREATED_AT))
        .with_size(page.size())
        .with_from(page.offset())
}

/// Profile search: text must match; profiles with an avatar or banner rank
/// higher but are not required.
pub fn profiles_query(text: &str, page: Page) -> SearchBody {
    let query = Query::Bool(BoolQuery {
        must: vec![Query::matching(FIELD_EVERYTHING, text)],
        should: vec![
            Query::term(FIELD_HAS_AVATAR, true),
            Query::term(FIELD_HAS_BANNER, true),
        ],
        filter: Vec::new(),
        boost: Some(1.0),
    });

    SearchBody::new(query)
        .with_size(page.size())
        .with_from(page.offset())
}

/// Typeahead: prefix-tolerant match over the typeahead field family.
pub fn typeahead_query(text: &str) -> SearchBody {
    let query = Query::MultiMatch(MultiMatchQuery {
        query: text.to_string(),
        match_type: MultiMatchType::BoolPrefix,
        fields: TYPEAHEAD_FIELDS.iter().map(|f| f.to_string()).collect(),
    });

    SearchBody::new(query).with_size(TYPEAHEAD_SIZE)
}

/// Query-string search with the full engine syntax.
///
/// Gives the caller direct control of the engine query language. Only build
/// this for trusted callers; see [`crate::QueryService::internal`].
pub fn generic_query(text: &str) -> SearchBody {
    SearchBody::new(Query::QueryString(QueryStringQuery {
        query: text.to_string(),
        default_operator: BoolOperator::And,
        analyze_wildcard: true,
        allow_leading_wildcard: false,
        lenient: true,
        default_field: FIELD_EVERYTHING.to_string(),
    }))
}
