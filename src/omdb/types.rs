use serde::{Deserialize, Serialize};

/// Parameters for a lookup by IMDb ID or exact title.
///
/// Nothing here is validated; whatever the caller sets is forwarded to OMDB
/// and OMDB's own error response comes back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupRequest {
    /// A valid IMDb ID (e.g. tt1285016).
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    /// movie, series or episode.
    pub media_type: Option<String>,
    pub year: Option<String>,
    /// short or full.
    pub plot: Option<String>,
    /// json or xml.
    pub return_type: Option<String>,
    /// JSONP callback name.
    pub callback: Option<String>,
    pub version: Option<String>,
}

/// Parameters for a title search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search: Option<String>,
    pub media_type: Option<String>,
    pub year: Option<String>,
    pub return_type: Option<String>,
    /// Page number, forwarded as given.
    pub page: Option<String>,
    pub callback: Option<String>,
    pub version: Option<String>,
}

// OMDB response shapes. Field names match OMDB exactly; every value stays a
// string because OMDB formats numbers inconsistently ("N/A", "1,234", "$5M").
// Fields OMDB leaves out (most of them on a "Response":"False" reply) stay
// out when the result is serialized again.

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Rated", skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(rename = "Released", skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(rename = "Runtime", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Director", skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Writer", skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(rename = "Actors", skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Plot", skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "Awards", skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(rename = "Poster", skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "Ratings", skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<Rating>>,
    #[serde(rename = "Metascore", skip_serializing_if = "Option::is_none")]
    pub metascore: Option<String>,
    #[serde(rename = "imdbRating", skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "imdbID", skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(rename = "DVD", skip_serializing_if = "Option::is_none")]
    pub dvd: Option<String>,
    #[serde(rename = "BoxOffice", skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
    #[serde(rename = "Production", skip_serializing_if = "Option::is_none")]
    pub production: Option<String>,
    #[serde(rename = "Website", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "Response", skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "Search", skip_serializing_if = "Option::is_none")]
    pub search: Option<Vec<SearchResultItem>>,
    #[serde(rename = "totalResults", skip_serializing_if = "Option::is_none")]
    pub total_results: Option<String>,
    #[serde(rename = "Response", skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResultItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub media_type: String,
    #[serde(rename = "Poster")]
    pub poster: String,
}
